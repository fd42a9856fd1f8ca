use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::loader::{DriveType, LoadError, ProjectFile, FORMAT_VERSION};
use crate::sample::TrajectorySample;
use crate::trajectory::{EventMarker, Trajectory};

const UNNAMED: &str = "<unnamed>";

#[derive(Deserialize)]
struct RawTrajectory {
    name: String,
    version: String,
    #[serde(default)]
    events: Option<Vec<Value>>,
    trajectory: Value,
}

#[derive(Deserialize)]
#[serde(bound = "S: DeserializeOwned")]
struct RawBody<S> {
    splits: Option<Vec<usize>>,
    samples: Vec<S>,
}

/// Builds a trajectory from the contents of a `.traj` file.
///
/// Events with an empty name or negative timestamp are dropped and the split
/// list always starts at sample 0.
pub fn parse_trajectory<S>(json: &str, project: &ProjectFile) -> Result<Trajectory<S>, LoadError>
where
    S: TrajectorySample + DeserializeOwned,
{
    let raw: RawTrajectory = serde_json::from_str(json).map_err(|e| parse_error(UNNAMED, e))?;

    if raw.version != FORMAT_VERSION {
        return Err(LoadError::VersionMismatch {
            file: format!("{}.traj", raw.name),
            found: raw.version,
            expected: FORMAT_VERSION,
        });
    }

    let events = filter_events(raw.events.unwrap_or_default());
    check_drive_type::<S>(&project.drive_type)?;

    let body: RawBody<S> =
        serde_json::from_value(raw.trajectory).map_err(|e| parse_error(&raw.name, e))?;
    let splits = normalize_splits(body.splits.unwrap_or_default());

    Ok(Trajectory::new(raw.name, body.samples, splits, events))
}

fn parse_error(name: &str, source: serde_json::Error) -> LoadError {
    LoadError::TrajectoryParse {
        name: name.to_string(),
        source,
    }
}

/// Keeps well-formed markers with a name and a non-negative timestamp, in file order.
fn filter_events(raw: Vec<Value>) -> Vec<EventMarker> {
    let total = raw.len();
    let events: Vec<EventMarker> = raw
        .into_iter()
        .filter_map(|value| serde_json::from_value::<EventMarker>(value).ok())
        .filter(EventMarker::is_valid)
        .collect();

    if events.len() < total {
        log::debug!("Dropped {} invalid event markers", total - events.len());
    }
    events
}

fn normalize_splits(mut splits: Vec<usize>) -> Vec<usize> {
    if splits.first() != Some(&0) {
        splits.insert(0, 0);
    }
    splits
}

fn check_drive_type<S: TrajectorySample>(declared: &DriveType) -> Result<(), LoadError> {
    match declared {
        DriveType::Unknown(other) => Err(LoadError::UnknownDriveType(other.clone())),
        DriveType::Differential => Err(LoadError::UnsupportedDriveType(DriveType::Differential)),
        declared if *declared != S::DRIVE_TYPE => Err(LoadError::SampleTypeMismatch {
            project: declared.clone(),
            requested: S::DRIVE_TYPE,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SwerveSample;
    use approx::assert_relative_eq;
    use serde_json::json;

    fn project(drive_type: DriveType) -> ProjectFile {
        ProjectFile {
            name: None,
            version: FORMAT_VERSION.to_string(),
            drive_type,
        }
    }

    fn sample_json(t: f64, x: f64) -> Value {
        json!({
            "t": t, "x": x, "y": 0.0, "heading": 0.0,
            "vx": 0.0, "vy": 0.0, "omega": 0.0,
            "ax": 0.0, "ay": 0.0, "alpha": 0.0,
            "fx": [0.0, 0.0, 0.0, 0.0], "fy": [0.0, 0.0, 0.0, 0.0]
        })
    }

    fn trajectory_json(splits: Value, events: Value) -> String {
        json!({
            "name": "line",
            "version": "v2025.0.0",
            "events": events,
            "trajectory": {
                "splits": splits,
                "samples": [sample_json(0.0, 0.0), sample_json(1.0, 10.0), sample_json(2.0, 20.0)]
            }
        })
        .to_string()
    }

    fn parse(json: &str) -> Result<Trajectory<SwerveSample>, LoadError> {
        parse_trajectory(json, &project(DriveType::Swerve))
    }

    #[test]
    fn test_parse_swerve_trajectory() {
        let traj = parse(&trajectory_json(json!([0, 2]), json!([]))).unwrap();
        assert_eq!(traj.name(), "line");
        assert_eq!(traj.samples().len(), 3);
        assert_eq!(traj.splits(), &[0, 2]);
        assert_relative_eq!(traj.sample_at(0.5).unwrap().x, 5.0);
    }

    #[test]
    fn test_splits_always_start_at_zero() {
        let traj = parse(&trajectory_json(json!([2]), json!([]))).unwrap();
        assert_eq!(traj.splits(), &[0, 2]);

        let traj = parse(&trajectory_json(json!([]), json!([]))).unwrap();
        assert_eq!(traj.splits(), &[0]);

        let traj = parse(&trajectory_json(json!(null), json!([]))).unwrap();
        assert_eq!(traj.splits(), &[0]);
    }

    #[test]
    fn test_invalid_events_are_dropped() {
        let events = json!([
            { "event": "intake", "timestamp": 0.5 },
            { "event": "", "timestamp": 1.0 },
            { "event": "early", "timestamp": -0.1 },
            { "event": "no_time" },
            "garbage",
            { "event": "shoot", "timestamp": 1.5 },
            { "event": "intake", "timestamp": 2.0 }
        ]);
        let traj = parse(&trajectory_json(json!([0]), events)).unwrap();

        assert_eq!(
            traj.events(),
            &[
                EventMarker::new("intake", 0.5),
                EventMarker::new("shoot", 1.5),
                EventMarker::new("intake", 2.0),
            ]
        );
        assert_eq!(traj.events_named("intake").len(), 2);
    }

    #[test]
    fn test_missing_events_is_empty() {
        let json = json!({
            "name": "bare",
            "version": "v2025.0.0",
            "trajectory": { "samples": [sample_json(0.0, 0.0)] }
        })
        .to_string();
        let traj = parse(&json).unwrap();
        assert!(traj.events().is_empty());
        assert_eq!(traj.splits(), &[0]);
    }

    #[test]
    fn test_wrong_version_is_fatal() {
        let json = trajectory_json(json!([0]), json!([])).replace("v2025.0.0", "v2024.2.1");
        let err = parse(&json).unwrap_err();
        assert!(matches!(err, LoadError::VersionMismatch { ref file, .. } if file == "line.traj"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_malformed_json_is_recoverable() {
        let err = parse("{ \"name\": ").unwrap_err();
        assert!(matches!(err, LoadError::TrajectoryParse { .. }));
        assert!(!err.is_fatal());

        let err =
            parse(r#"{ "name": "x", "version": "v2025.0.0", "trajectory": {} }"#).unwrap_err();
        assert!(matches!(err, LoadError::TrajectoryParse { ref name, .. } if name == "x"));
    }

    #[test]
    fn test_drive_type_dispatch() {
        let json = trajectory_json(json!([0]), json!([]));

        let err = parse_trajectory::<SwerveSample>(&json, &project(DriveType::Differential))
            .unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedDriveType(DriveType::Differential)));
        assert!(err.is_fatal());

        let err =
            parse_trajectory::<SwerveSample>(&json, &project(DriveType::Unknown("Tank".into())))
                .unwrap_err();
        assert!(matches!(err, LoadError::UnknownDriveType(ref t) if t == "Tank"));
        assert!(err.is_fatal());
    }
}

use crate::lap::codec::LapRecord;
use std::fmt;

/// Identity of a lap: who drove it, where, in what, and when.
///
/// Two payloads that agree on these fields are the same lap even if their
/// bytes differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LapFingerprint {
    pub player_name: String,
    pub player_surname: String,
    pub track: String,
    pub car_model: String,
    pub timestamp: i64,
}

impl LapFingerprint {
    pub fn of(lap: &LapRecord) -> Self {
        LapFingerprint {
            player_name: lap.player_name.clone(),
            player_surname: lap.player_surname.clone(),
            track: lap.track.clone(),
            car_model: lap.car_model.clone(),
            timestamp: lap.timestamp,
        }
    }

    /// Blob store key for this lap
    pub fn storage_path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for LapFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "laps/{}_{}/{}_{}/{}.lap",
            self.player_name, self.player_surname, self.track, self.car_model, self.timestamp
        )
    }
}

/// Storage path derived from the identity fields of `lap`
pub fn fingerprint(lap: &LapRecord) -> String {
    LapFingerprint::of(lap).storage_path()
}

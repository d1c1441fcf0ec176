// Backup artifact domain model and file name grammar
//
// dashboard_{id}_{YYYYMMDD_HHMMSS}.{json|yaml}
use crate::domain::dashboard_id::DashboardId;
use chrono::NaiveDateTime;
use serde::Serialize;

pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TIMESTAMP_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupEncoding {
    /// Byte copy of the persisted storage entry
    Raw,
    /// The entry's `data` field as a readable document
    Derived,
}

impl BackupEncoding {
    pub fn extension(self) -> &'static str {
        match self {
            BackupEncoding::Raw => "json",
            BackupEncoding::Derived => "yaml",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "json" => Some(BackupEncoding::Raw),
            "yaml" => Some(BackupEncoding::Derived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    pub dashboard_id: DashboardId,
    pub timestamp: NaiveDateTime,
    pub encoding: BackupEncoding,
}

impl BackupArtifact {
    pub fn new(dashboard_id: DashboardId, timestamp: NaiveDateTime, encoding: BackupEncoding) -> Self {
        Self {
            dashboard_id,
            timestamp,
            encoding,
        }
    }

    pub fn file_name(&self) -> String {
        format!(
            "{}{}.{}",
            Self::prefix(&self.dashboard_id),
            format_timestamp(&self.timestamp),
            self.encoding.extension()
        )
    }

    /// Parse a file name that belongs to `dashboard_id`.
    ///
    /// The match is anchored on the literal prefix plus a fixed-width
    /// timestamp, so `dashboard_a_b_...` never matches id `a`.
    pub fn parse(file_name: &str, dashboard_id: &DashboardId) -> Option<Self> {
        let rest = file_name.strip_prefix(&Self::prefix(dashboard_id))?;
        let (stamp, ext) = rest.rsplit_once('.')?;
        if stamp.len() != TIMESTAMP_LEN {
            return None;
        }
        let encoding = BackupEncoding::from_extension(ext)?;
        let timestamp = parse_timestamp(stamp)?;
        Some(Self::new(dashboard_id.clone(), timestamp, encoding))
    }

    fn prefix(dashboard_id: &DashboardId) -> String {
        format!("dashboard_{}_", dashboard_id)
    }
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(stamp: &str) -> Option<NaiveDateTime> {
    if !stamp.bytes().enumerate().all(|(i, b)| if i == 8 { b == b'_' } else { b.is_ascii_digit() }) {
        return None;
    }
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()
}

/// Pick the artifact restore should use when none is named: the newest raw
/// artifact, falling back to the newest derived one.
pub fn select_latest(artifacts: &[BackupArtifact]) -> Option<&BackupArtifact> {
    [BackupEncoding::Raw, BackupEncoding::Derived]
        .into_iter()
        .find_map(|encoding| {
            artifacts
                .iter()
                .filter(|a| a.encoding == encoding)
                .max_by_key(|a| a.timestamp)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn id(raw: &str) -> DashboardId {
        DashboardId::parse(raw).unwrap()
    }

    #[test]
    fn test_file_name() {
        let artifact = BackupArtifact::new(id("lovelace"), ts(0, 0, 0), BackupEncoding::Raw);
        assert_eq!(artifact.file_name(), "dashboard_lovelace_20240101_000000.json");

        let artifact = BackupArtifact::new(id("energy"), ts(13, 5, 9), BackupEncoding::Derived);
        assert_eq!(artifact.file_name(), "dashboard_energy_20240101_130509.yaml");
    }

    #[test]
    fn test_parse_matches_grammar() {
        let parsed = BackupArtifact::parse("dashboard_lovelace_20240101_130509.yaml", &id("lovelace")).unwrap();
        assert_eq!(parsed.timestamp, ts(13, 5, 9));
        assert_eq!(parsed.encoding, BackupEncoding::Derived);
    }

    #[test]
    fn test_parse_anchors_on_id_with_underscores() {
        let name = "dashboard_home_office_20240101_000000.json";
        assert!(BackupArtifact::parse(name, &id("home_office")).is_some());
        assert!(BackupArtifact::parse(name, &id("home")).is_none());
        assert!(BackupArtifact::parse(name, &id("office")).is_none());
    }

    #[test]
    fn test_parse_rejects_malformed_names() {
        let lovelace = id("lovelace");
        for name in [
            "dashboard_lovelace_20240101_000000.yml",
            "dashboard_lovelace_20240101_000000.json.bak",
            "dashboard_lovelace_2024010_000000.json",
            "dashboard_lovelace_20240101-000000.json",
            "dashboard_lovelace_20241301_000000.json",
            "dashboard_lovelace_.json",
            "dashboard_lovelace_20240101_000000",
            "lovelace_20240101_000000.json",
        ] {
            assert!(BackupArtifact::parse(name, &lovelace).is_none(), "{} should not parse", name);
        }
    }

    #[test]
    fn test_select_latest_prefers_raw() {
        let lovelace = id("lovelace");
        let artifacts = vec![
            BackupArtifact::new(lovelace.clone(), ts(1, 0, 0), BackupEncoding::Raw),
            BackupArtifact::new(lovelace.clone(), ts(2, 0, 0), BackupEncoding::Derived),
            BackupArtifact::new(lovelace.clone(), ts(2, 0, 0), BackupEncoding::Raw),
            BackupArtifact::new(lovelace.clone(), ts(0, 30, 0), BackupEncoding::Raw),
        ];
        let latest = select_latest(&artifacts).unwrap();
        assert_eq!(latest.timestamp, ts(2, 0, 0));
        assert_eq!(latest.encoding, BackupEncoding::Raw);
    }

    #[test]
    fn test_select_latest_falls_back_to_derived() {
        let lovelace = id("lovelace");
        let artifacts = vec![
            BackupArtifact::new(lovelace.clone(), ts(1, 0, 0), BackupEncoding::Derived),
            BackupArtifact::new(lovelace.clone(), ts(3, 0, 0), BackupEncoding::Derived),
        ];
        assert_eq!(select_latest(&artifacts).unwrap().timestamp, ts(3, 0, 0));
        assert!(select_latest(&[]).is_none());
    }
}

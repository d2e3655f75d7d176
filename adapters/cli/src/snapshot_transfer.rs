use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use maze_quest_core::{MazeReference, SaveSnapshot};
use thiserror::Error;

const SNAPSHOT_DOMAIN: &str = "quest";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "quest:v1";
/// Delimiter used to separate the prefix, maze dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes a snapshot into a single line: `quest:v1:<columns>x<rows>:<payload>`.
///
/// The payload is the snapshot as JSON, base64 encoded without padding.
pub(crate) fn encode(snapshot: &SaveSnapshot) -> Result<String, SnapshotTransferError> {
    let (columns, rows) = maze_dimensions(&snapshot.maze);
    let json = serde_json::to_vec(snapshot).map_err(SnapshotTransferError::InvalidPayload)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    Ok(format!("{SNAPSHOT_HEADER}:{columns}x{rows}:{encoded}"))
}

/// Decodes a snapshot from its single-line representation.
pub(crate) fn decode(value: &str) -> Result<SaveSnapshot, SnapshotTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SnapshotTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(SnapshotTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(SnapshotTransferError::MissingVersion)?;
    let dimensions = parts
        .next()
        .ok_or(SnapshotTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(SnapshotTransferError::MissingPayload)?;

    if domain != SNAPSHOT_DOMAIN {
        return Err(SnapshotTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != SNAPSHOT_VERSION {
        return Err(SnapshotTransferError::UnsupportedVersion(
            version.to_owned(),
        ));
    }

    let declared = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(SnapshotTransferError::InvalidEncoding)?;
    let snapshot: SaveSnapshot =
        serde_json::from_slice(&bytes).map_err(SnapshotTransferError::InvalidPayload)?;

    let actual = maze_dimensions(&snapshot.maze);
    if actual != declared {
        return Err(SnapshotTransferError::DimensionMismatch { declared, actual });
    }

    Ok(snapshot)
}

/// Errors that can occur while encoding or decoding snapshot strings.
#[derive(Debug, Error)]
pub(crate) enum SnapshotTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("snapshot payload was empty")]
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    #[error("snapshot string is missing the prefix")]
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    #[error("snapshot string is missing the version")]
    MissingVersion,
    /// The encoded snapshot did not include maze dimensions.
    #[error("snapshot string is missing the maze dimensions")]
    MissingDimensions,
    /// The encoded snapshot did not include the payload segment.
    #[error("snapshot string is missing the payload")]
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    #[error("snapshot prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    #[error("snapshot version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The maze dimensions could not be parsed.
    #[error("could not parse maze dimensions '{0}'")]
    InvalidDimensions(String),
    /// The declared dimensions disagree with the maze stored in the payload.
    #[error("snapshot declares a {}x{} maze but stores a {}x{} one", .declared.0, .declared.1, .actual.0, .actual.1)]
    DimensionMismatch {
        /// Dimensions written in the header.
        declared: (u32, u32),
        /// Dimensions of the stored maze reference.
        actual: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode snapshot payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The payload could not be serialised or deserialised.
    #[error("could not process snapshot payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

fn maze_dimensions(maze: &MazeReference) -> (u32, u32) {
    match maze {
        MazeReference::Generated { columns, rows, .. } => (*columns, *rows),
        MazeReference::Layout { rows } => {
            let columns = rows
                .iter()
                .map(|row| row.chars().count())
                .max()
                .unwrap_or(0);
            (
                u32::try_from(columns).unwrap_or(u32::MAX),
                u32::try_from(rows.len()).unwrap_or(u32::MAX),
            )
        }
    }
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), SnapshotTransferError> {
    let invalid = || SnapshotTransferError::InvalidDimensions(dimensions.to_owned());
    let (columns, rows) = dimensions.split_once(['x', 'X']).ok_or_else(invalid)?;

    let columns = columns.trim().parse::<u32>().map_err(|_| invalid())?;
    let rows = rows.trim().parse::<u32>().map_err(|_| invalid())?;

    if columns == 0 || rows == 0 {
        return Err(invalid());
    }

    Ok((columns, rows))
}

#[cfg(test)]
mod tests {
    use maze_quest_core::{
        AchievementId, CellCoord, Direction, Health, Inventory, PlayerRecord, QuestId, Stats,
        Weapon,
    };

    use super::*;

    fn snapshot(maze: MazeReference) -> SaveSnapshot {
        SaveSnapshot {
            maze,
            player: PlayerRecord {
                cell: CellCoord::new(3, 5),
                health: Health::new(64),
                max_health: Health::new(125),
                facing: Direction::West,
                weapon: Weapon::Bow,
                weapon_level: 2,
            },
            inventory: Inventory::new(1, 2, 0),
            stats: Stats {
                enemies_defeated: 4,
                ..Stats::default()
            },
            achievements: vec![AchievementId::new(1)],
            quests: vec![QuestId::new(1)],
        }
    }

    #[test]
    fn generated_mazes_round_trip() {
        let snapshot = snapshot(MazeReference::Generated {
            seed: 99,
            columns: 21,
            rows: 15,
        });

        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with(&format!("{SNAPSHOT_HEADER}:21x15:")));

        let decoded = decode(&encoded).expect("snapshot decodes");
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn layout_dimensions_come_from_the_rows() {
        let snapshot = snapshot(MazeReference::Layout {
            rows: vec!["P..r".to_owned(), "....".to_owned()],
        });

        let encoded = encode(&snapshot).expect("snapshot encodes");
        assert!(encoded.starts_with("quest:v1:4x2:"));
        assert_eq!(decode(&format!("  {encoded}\n")).expect("decodes"), snapshot);
    }

    #[test]
    fn malformed_headers_are_rejected() {
        assert!(matches!(decode("   "), Err(SnapshotTransferError::EmptyPayload)));
        assert!(matches!(
            decode("maze:v1:4x2:AAAA"),
            Err(SnapshotTransferError::InvalidPrefix(prefix)) if prefix == "maze"
        ));
        assert!(matches!(
            decode("quest:v2:4x2:AAAA"),
            Err(SnapshotTransferError::UnsupportedVersion(_))
        ));
        assert!(matches!(
            decode("quest:v1:0x2:AAAA"),
            Err(SnapshotTransferError::InvalidDimensions(_))
        ));
        assert!(matches!(
            decode("quest:v1:4x2"),
            Err(SnapshotTransferError::MissingPayload)
        ));
        assert!(matches!(
            decode("quest:v1:4x2:!!!"),
            Err(SnapshotTransferError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn mismatched_dimensions_are_rejected() {
        let encoded = encode(&snapshot(MazeReference::Generated {
            seed: 1,
            columns: 9,
            rows: 9,
        }))
        .expect("snapshot encodes");
        let forged = encoded.replacen("9x9", "11x9", 1);

        assert!(matches!(
            decode(&forged),
            Err(SnapshotTransferError::DimensionMismatch {
                declared: (11, 9),
                actual: (9, 9)
            })
        ));
    }
}

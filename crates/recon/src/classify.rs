use crate::inventory::InventoryMap;
use crate::model::{Artifact, Outcome, Record};

pub const VIEW_LINK_HOST: &str = "drive.google.com";

/// File name a record's invoice is expected under in the staging folder.
pub fn expected_name(identifier: &str) -> String {
    format!("Invoice_{identifier}.pdf")
}

/// Canonical browser link for a file id.
pub fn view_link(file_id: &str) -> String {
    format!("https://{VIEW_LINK_HOST}/file/d/{file_id}/view")
}

/// What the engine should do with one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision<'a> {
    AlreadyLinked,
    NoIdentifier,
    MissingArtifact { expected_name: String },
    MissingDestination { artifact: &'a Artifact },
    Move { artifact: &'a Artifact, destination: &'a str },
}

impl Decision<'_> {
    /// Final outcome for decisions that need no store calls; `None` for
    /// `Move`, whose outcome depends on the stores.
    pub fn settled_outcome(&self) -> Option<Outcome> {
        match self {
            Self::AlreadyLinked => Some(Outcome::AlreadyLinked),
            Self::NoIdentifier => Some(Outcome::NoIdentifier),
            Self::MissingArtifact { .. } => Some(Outcome::MissingArtifact),
            Self::MissingDestination { .. } => Some(Outcome::MissingDestination),
            Self::Move { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::AlreadyLinked => "already_linked",
            Self::NoIdentifier => "no_identifier",
            Self::MissingArtifact { .. } => "missing_artifact",
            Self::MissingDestination { .. } => "missing_destination",
            Self::Move { .. } => "move",
        }
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::MissingDestination { artifact } | Self::Move { artifact, .. } => Some(*artifact),
            _ => None,
        }
    }
}

/// Ordered rules, first match wins:
/// link present → identifier blank → file missing → destination blank → move.
pub fn classify<'a>(record: &'a Record, inventory: &'a InventoryMap) -> Decision<'a> {
    if record.completion_link.is_some() {
        return Decision::AlreadyLinked;
    }

    let Some(identifier) = record.identifier.as_deref() else {
        return Decision::NoIdentifier;
    };

    let name = expected_name(identifier);
    let Some(artifact) = inventory.get(&name) else {
        return Decision::MissingArtifact { expected_name: name };
    };

    match record.destination.as_deref() {
        None => Decision::MissingDestination { artifact },
        Some(destination) => Decision::Move {
            artifact,
            destination,
        },
    }
}

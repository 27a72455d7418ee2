//! Generation domain module: the remote capability the orchestrator drives
//! and the progress events it emits.

mod progress;
mod remote;

pub use progress::ProgressEvent;
pub use remote::{
    ArtifactRef, GenerationRequest, OperationOutcome, RemoteGenerationClient, RemoteOperation,
};

pub mod context;
pub mod proposal;

pub use context::{ContextPart, ContextType};
pub use proposal::{ProposalStatus, ProposalUpdate, UpdateData};

pub mod fields;
pub mod inventory;
pub mod network;

pub use inventory::{
    DispositivoDraft, EnteDraft, ImpiegatoDraft, OrdineDraft, ReteDraft, ServizioDraft,
};

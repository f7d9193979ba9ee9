pub mod partition;
pub mod record;

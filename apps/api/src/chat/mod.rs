pub mod bias;
pub mod handlers;
pub mod intent;
pub mod listings;
pub mod pipeline;
pub mod prompts;

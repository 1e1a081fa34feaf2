//! Page Components

mod assistant;

pub use assistant::AssistantPage;

pub mod claude;
pub mod cohere;
pub mod llama;
pub mod stability;
pub mod titan;

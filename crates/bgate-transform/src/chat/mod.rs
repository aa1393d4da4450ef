pub mod openai2claude;
pub mod openai2cohere;
pub mod openai2llama;
pub mod openai2stability;
pub mod openai2titan;

pub mod bedrock;
pub mod openai;

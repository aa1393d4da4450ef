use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelObjectType {
    #[serde(rename = "model")]
    Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelListObjectType {
    #[serde(rename = "list")]
    List,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub object: ModelObjectType,
    pub created: i64,
    pub owned_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListModelsResponse {
    pub object: ModelListObjectType,
    pub data: Vec<ModelDescriptor>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_model_descriptor() {
        let response = ListModelsResponse {
            object: ModelListObjectType::List,
            data: vec![ModelDescriptor {
                id: "gpt-4".to_string(),
                object: ModelObjectType::Model,
                created: 1_700_000_000,
                owned_by: "aws-bedrock".to_string(),
            }],
        };

        let value = serde_json::to_value(&response).expect("serialize model list");
        assert_eq!(value["object"], "list");
        assert_eq!(value["data"][0]["object"], "model");
        assert_eq!(value["data"][0]["owned_by"], "aws-bedrock");
    }
}

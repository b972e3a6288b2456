// common/src/models/context.rs
use serde::{Deserialize, Serialize};

/// Section of the shared narrative configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    World,
    Laws,
    Personality,
    Characters,
    Examples,
}

/// One editable part of the narrative context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextPart {
    #[serde(rename = "type")]
    pub context_type: ContextType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_part_uses_type_key() {
        let part: ContextPart = serde_json::from_value(json!({
            "type": "laws",
            "content": "No magic after dusk",
            "author": "0xabc"
        }))
        .unwrap();
        assert_eq!(part.context_type, ContextType::Laws);
        assert_eq!(part.author.as_deref(), Some("0xabc"));
    }

    #[test]
    fn test_unknown_context_type_is_rejected() {
        let parsed = serde_json::from_value::<ContextPart>(json!({
            "type": "weather",
            "content": "rain"
        }));
        assert!(parsed.is_err());
    }
}

use serde::{Deserialize, Serialize};

use tundra_shared::{
    message_id::{self, MessageId},
    BitWrite, Deserializer, SerdeErr,
};

use super::{IncomingMessage, NetworkMessage};

/// The usual login properties. Servers accept arbitrary extra keys, which
/// are carried in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LoginProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LoginProperties {
    pub fn with_username(username: &str) -> Self {
        Self {
            username: Some(username.to_string()),
            ..Self::default()
        }
    }
}

/// Login request: the login properties as a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginMessage {
    pub login_data: String,
}

impl LoginMessage {
    pub fn new(login_data: String) -> Self {
        Self { login_data }
    }

    pub fn from_properties<P: Serialize>(properties: &P) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_string(properties)?))
    }
}

impl NetworkMessage for LoginMessage {
    fn id(&self) -> MessageId {
        message_id::LOGIN
    }

    fn write_body(&self, writer: &mut dyn BitWrite) -> Result<(), SerdeErr> {
        writer.write_string_u16(&self.login_data)
    }
}

impl IncomingMessage for LoginMessage {
    const ID: MessageId = message_id::LOGIN;

    fn deserialize(reader: &mut Deserializer) -> Result<Self, SerdeErr> {
        Ok(Self::new(reader.read_string_u16()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_become_json() {
        let mut properties = LoginProperties::with_username("alice");
        properties.extra.insert("avatar".to_string(), serde_json::json!("default"));
        let message = LoginMessage::from_properties(&properties).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&message.login_data).unwrap();
        assert_eq!(parsed["username"], "alice");
        assert_eq!(parsed["avatar"], "default");
        assert!(parsed.get("password").is_none());
    }

    #[test]
    fn wire_layout() {
        let message = LoginMessage::new("{}".to_string()).serialize().unwrap();
        assert_eq!(message.buffer(), Some(&[100, 0, 2, 0, b'{', b'}'][..]));

        let bytes = message.buffer().unwrap();
        let mut reader = Deserializer::new(&bytes[2..]);
        assert_eq!(LoginMessage::deserialize(&mut reader).unwrap().login_data, "{}");
    }
}

use crate::model::Id;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use thiserror::Error;

pub const USER_NAME_MAX_LEN: usize = 100;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct UserMarker;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct User {
    pub id: Id<UserMarker>,
    pub name: UserName,
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The user name is invalid: {0:?}")]
pub struct InvalidUserNameError(String);

impl UserName {
    pub fn new(name: String) -> Result<Self, InvalidUserNameError> {
        let len = name.chars().count();
        if len > 0 && len <= USER_NAME_MAX_LEN {
            Ok(UserName(name))
        } else {
            Err(InvalidUserNameError(name))
        }
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        UserName::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"UserName"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::user::{USER_NAME_MAX_LEN, User, UserName};

    #[test]
    fn user_name_length() {
        assert!(UserName::new("Leanne Graham".to_owned()).is_ok());
        assert!(UserName::new("ä".repeat(USER_NAME_MAX_LEN)).is_ok());

        assert!(UserName::new(String::new()).is_err());
        assert!(UserName::new("a".repeat(USER_NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn invalid_user_name_is_rejected_on_deserialize() {
        let user: User = serde_json::from_str(r#"{"id": 1, "name": "Ervin Howell"}"#).unwrap();
        assert_eq!(user.name.get(), "Ervin Howell");

        assert!(serde_json::from_str::<User>(r#"{"id": 1, "name": ""}"#).is_err());
    }
}

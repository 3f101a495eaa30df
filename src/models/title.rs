use serde::Serialize;

use crate::domain::{NameId, TitleId};
use crate::entities::{names, titles};
use crate::search::Searchable;

/// A canonical name as shown to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Name {
    pub id: NameId,
    pub name: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<names::Model> for Name {
    fn from(model: names::Model) -> Self {
        Self {
            id: NameId::new(model.id),
            name: model.name,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// A title together with its primary name and every alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Title {
    pub id: TitleId,
    pub kind: String,
    pub episodes: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub name: Name,
    pub aliases: Vec<Name>,
    pub created_at: String,
    pub updated_at: String,
}

impl Title {
    pub(crate) fn assemble(
        title: titles::Model,
        name: names::Model,
        aliases: Vec<names::Model>,
    ) -> Self {
        Self {
            id: TitleId::new(title.id),
            kind: title.kind,
            episodes: title.episodes,
            description: title.description,
            image_url: title.image_url,
            name: name.into(),
            aliases: aliases.into_iter().map(Name::from).collect(),
            created_at: title.created_at,
            updated_at: title.updated_at,
        }
    }
}

impl Searchable for Title {
    fn primary_name(&self) -> &str {
        &self.name.name
    }

    fn alias_names(&self) -> impl Iterator<Item = &str> {
        self.aliases.iter().map(|alias| alias.name.as_str())
    }
}

/// Fields for registering a title.
#[derive(Debug, Clone, Default)]
pub struct NewTitle {
    pub name: String,
    pub kind: String,
    pub episodes: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub aliases: Vec<String>,
}

/// Partial update of a title. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TitleChanges {
    pub name: Option<String>,
    pub episodes: Option<i32>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub aliases: Vec<String>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::model::{NewTraining, Training, TrainingStatus};

#[derive(Deserialize)]
pub(crate) struct TrainingNode {
    #[serde(deserialize_with = "id_from_any")]
    pub(crate) id: String,
    pub(crate) titulo: Option<String>,
    pub(crate) descricao: Option<String>,
    pub(crate) formato: Option<String>,
    pub(crate) preco: Option<f64>,
    #[serde(default)]
    pub(crate) status: TrainingStatus,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub(crate) created_at: Option<DateTime<Utc>>,
}

/// Listing endpoints answer either with a bare array or wrapped in `treinamentos`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum TrainingList {
    Bare(Vec<TrainingNode>),
    Wrapped { treinamentos: Vec<TrainingNode> },
}

impl TrainingList {
    pub(crate) fn into_nodes(self) -> Vec<TrainingNode> {
        match self {
            Self::Bare(v) | Self::Wrapped { treinamentos: v } => v,
        }
    }
}

#[derive(Serialize)]
pub(crate) struct TrainingPayload<'a> {
    pub(crate) titulo: &'a str,
    pub(crate) descricao: &'a str,
    pub(crate) formato: &'a str,
    pub(crate) preco: f64,
    pub(crate) status: TrainingStatus,
}

impl<'a> From<&'a NewTraining> for TrainingPayload<'a> {
    fn from(t: &'a NewTraining) -> Self {
        Self {
            titulo: &t.title,
            descricao: &t.description,
            formato: &t.format,
            preco: t.price,
            status: t.status,
        }
    }
}

impl From<TrainingNode> for Training {
    fn from(n: TrainingNode) -> Self {
        Self {
            id: n.id,
            title: n.titulo.unwrap_or_default(),
            description: n.descricao,
            format: n.formato,
            price: n.preco.unwrap_or(0.0),
            status: n.status,
            created_at: n.created_at,
        }
    }
}

fn id_from_any<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match Value::deserialize(d)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {other}"
        ))),
    }
}

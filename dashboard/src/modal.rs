//! Shared create/edit modal.
//!
//! One `EntityModal` serves every entity kind in Create or Edit mode, plus
//! the two relationship forms. Fields hold raw user text; `validate` turns
//! them into a typed `Submission` or a `ClientError::Validation` without
//! touching the network.

use crate::{ClientError, Result};
use streamgraph_core::model::{
    CreateConsumer, CreateProducer, CreateTopic, PublishLink, SubscribeLink, UpdateConsumer,
    UpdateProducer, UpdateTopic,
};
use streamgraph_core::{EntityKind, TopicSummary};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    /// Editing the entity currently identified by `original`
    Edit { original: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalForm {
    Topic { name: String, message_count: String },
    Producer { id: String },
    Consumer { id: String, group: String },
    Publish {
        producer_id: String,
        topic_name: String,
        message_count: String,
    },
    Subscribe { consumer_id: String, topic_name: String },
}

/// Validated modal contents, ready to send
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    CreateTopic(CreateTopic),
    UpdateTopic { name: String, body: UpdateTopic },
    CreateProducer(CreateProducer),
    UpdateProducer { id: String, body: UpdateProducer },
    CreateConsumer(CreateConsumer),
    UpdateConsumer { id: String, body: UpdateConsumer },
    Publish(PublishLink),
    Subscribe(SubscribeLink),
}

impl Submission {
    /// Notification shown once the gateway accepted the submission
    pub fn success_message(&self) -> &'static str {
        match self {
            Submission::CreateTopic(_) => "Topic created successfully!",
            Submission::UpdateTopic { .. } => "Topic updated successfully!",
            Submission::CreateProducer(_) => "Producer created successfully!",
            Submission::UpdateProducer { .. } => "Producer updated successfully!",
            Submission::CreateConsumer(_) => "Consumer created successfully!",
            Submission::UpdateConsumer { .. } => "Consumer updated successfully!",
            Submission::Publish(_) => "Relationship created successfully!",
            Submission::Subscribe(_) => "Subscription created successfully!",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityModal {
    pub mode: ModalMode,
    pub form: ModalForm,
}

fn required(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Blank means zero; anything else must be a non-negative integer.
fn message_count(value: &str) -> Result<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed
        .parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| {
            ClientError::Validation("Message count must be a non-negative integer".into())
        })
}

impl EntityModal {
    pub fn create(kind: EntityKind) -> Self {
        let form = match kind {
            EntityKind::Topic => ModalForm::Topic {
                name: String::new(),
                message_count: "0".into(),
            },
            EntityKind::Producer => ModalForm::Producer { id: String::new() },
            EntityKind::Consumer => ModalForm::Consumer {
                id: String::new(),
                group: String::new(),
            },
        };
        Self {
            mode: ModalMode::Create,
            form,
        }
    }

    /// Edit an existing entity; the identity field starts prefilled.
    /// A topic's count starts blank and is left untouched unless filled in.
    pub fn edit(kind: EntityKind, key: impl Into<String>) -> Self {
        let key = key.into();
        let form = match kind {
            EntityKind::Topic => ModalForm::Topic {
                name: key.clone(),
                message_count: String::new(),
            },
            EntityKind::Producer => ModalForm::Producer { id: key.clone() },
            EntityKind::Consumer => ModalForm::Consumer {
                id: key.clone(),
                group: String::new(),
            },
        };
        Self {
            mode: ModalMode::Edit { original: key },
            form,
        }
    }

    /// Edit a listed topic with its current count prefilled
    pub fn edit_topic(topic: &TopicSummary) -> Self {
        Self {
            mode: ModalMode::Edit {
                original: topic.name.clone(),
            },
            form: ModalForm::Topic {
                name: topic.name.clone(),
                message_count: topic.message_count.to_string(),
            },
        }
    }

    pub fn publish() -> Self {
        Self {
            mode: ModalMode::Create,
            form: ModalForm::Publish {
                producer_id: String::new(),
                topic_name: String::new(),
                message_count: "0".into(),
            },
        }
    }

    pub fn subscribe() -> Self {
        Self {
            mode: ModalMode::Create,
            form: ModalForm::Subscribe {
                consumer_id: String::new(),
                topic_name: String::new(),
            },
        }
    }

    pub fn title(&self) -> String {
        let subject = match &self.form {
            ModalForm::Topic { .. } => "Topic",
            ModalForm::Producer { .. } => "Producer",
            ModalForm::Consumer { .. } => "Consumer",
            ModalForm::Publish { .. } => return "Link Producer to Topic".into(),
            ModalForm::Subscribe { .. } => return "Subscribe Consumer to Topic".into(),
        };
        match self.mode {
            ModalMode::Create => format!("Add New {}", subject),
            ModalMode::Edit { .. } => format!("Edit {}", subject),
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (&self.mode, &self.form) {
            (_, ModalForm::Publish { .. } | ModalForm::Subscribe { .. }) => "Link",
            (ModalMode::Create, _) => "Create",
            (ModalMode::Edit { .. }, _) => "Update",
        }
    }

    pub fn validate(&self) -> Result<Submission> {
        let original = match &self.mode {
            ModalMode::Create => None,
            ModalMode::Edit { original } => Some(original.clone()),
        };

        match &self.form {
            ModalForm::Topic {
                name,
                message_count: count,
            } => {
                let name = required(name, "Topic name is required")?;
                Ok(match original {
                    None => Submission::CreateTopic(CreateTopic {
                        name: Some(name),
                        message_count: Some(message_count(count)?),
                    }),
                    // blank count on edit keeps the stored value
                    Some(original) => Submission::UpdateTopic {
                        body: UpdateTopic {
                            new_name: (name != original).then_some(name),
                            message_count: optional(count)
                                .map(|c| message_count(&c))
                                .transpose()?,
                        },
                        name: original,
                    },
                })
            }
            ModalForm::Producer { id } => {
                let id = required(id, "Producer ID is required")?;
                Ok(match original {
                    None => Submission::CreateProducer(CreateProducer { id: Some(id) }),
                    Some(original) => Submission::UpdateProducer {
                        body: UpdateProducer {
                            new_id: (id != original).then_some(id),
                        },
                        id: original,
                    },
                })
            }
            ModalForm::Consumer { id, group } => {
                let id = required(id, "Consumer ID is required")?;
                let group = optional(group);
                Ok(match original {
                    None => Submission::CreateConsumer(CreateConsumer {
                        id: Some(id),
                        group,
                    }),
                    Some(original) => Submission::UpdateConsumer {
                        body: UpdateConsumer {
                            new_id: (id != original).then_some(id),
                            group,
                        },
                        id: original,
                    },
                })
            }
            ModalForm::Publish {
                producer_id,
                topic_name,
                message_count: count,
            } => {
                let missing = "Producer ID and Topic name are required";
                Ok(Submission::Publish(PublishLink {
                    producer_id: Some(required(producer_id, missing)?),
                    topic_name: Some(required(topic_name, missing)?),
                    message_count: Some(message_count(count)?),
                }))
            }
            ModalForm::Subscribe {
                consumer_id,
                topic_name,
            } => {
                let missing = "Consumer ID and Topic name are required";
                Ok(Submission::Subscribe(SubscribeLink {
                    consumer_id: Some(required(consumer_id, missing)?),
                    topic_name: Some(required(topic_name, missing)?),
                }))
            }
        }
    }
}

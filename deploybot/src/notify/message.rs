//! Rich-text ("post") message composition for the chat webhook.
//!
//! Wire format:
//!
//! ```json
//! {
//!   "msg_type": "post",
//!   "content": { "post": { "zh_cn": {
//!       "title": "Deploy succeeded",
//!       "content": [[{"tag": "text", "text": "Service name: checkout"}], ...]
//!   }}},
//!   "timestamp": "1700000000",
//!   "sign": "base64..."
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::notify::context::NotificationContext;
use crate::notify::signing;
use crate::types::ApplyId;

/// `msg_type` of a rich-text post
pub const POST_MSG_TYPE: &str = "post";

/// Label of the deploy detail links
pub const DEPLOY_LINK_TEXT: &str = "Deploy link";

/// Element kind inside a post line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "a")]
    Link,
}

/// One element of a post line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostElement {
    pub tag: Tag,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl PostElement {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: Tag::Text,
            text: text.into(),
            href: None,
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            tag: Tag::Link,
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// Title plus ordered lines of elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostBody {
    pub title: String,
    pub content: Vec<Vec<PostElement>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedPost {
    pub zh_cn: PostBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    pub post: LocalizedPost,
}

/// Complete signed request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeishuMessage {
    pub msg_type: String,
    pub content: PostContent,
    /// Unix seconds, as a decimal string
    pub timestamp: String,
    pub sign: String,
}

impl FeishuMessage {
    /// Wrap `body` into a rich-text post signed for `timestamp`.
    pub fn signed_post(body: PostBody, timestamp: i64, secret: &str) -> Result<Self> {
        let sign = signing::sign(secret, timestamp)?;

        Ok(Self {
            msg_type: POST_MSG_TYPE.to_string(),
            content: PostContent {
                post: LocalizedPost { zh_cn: body },
            },
            timestamp: timestamp.to_string(),
            sign,
        })
    }

    pub fn body(&self) -> &PostBody {
        &self.content.post.zh_cn
    }
}

/// `{app_host}/deploy/deploy?id={apply_id}`, with one trailing `/` on the host ignored.
pub fn deploy_link(app_host: &str, apply_id: ApplyId) -> String {
    format!("{}/deploy/deploy?id={}", app_host.trim_end_matches('/'), apply_id)
}

/// Render the seven message lines for a resolved deployment.
pub fn render(ctx: &NotificationContext, app_host: &str) -> PostBody {
    let link = deploy_link(app_host, ctx.apply.id);

    let mut version_line = vec![PostElement::text(format!("Service version: {}", ctx.apply.version()))];
    if !ctx.apply.commit_version.is_empty() {
        version_line.push(PostElement::text(format!("commitVersion:{}", ctx.apply.commit_version)));
    }

    let content = vec![
        vec![PostElement::text(format!("Service name: {}", ctx.project.name))],
        version_line,
        vec![PostElement::text(format!("Commit message: {}", ctx.commit_message))],
        vec![PostElement::text(format!("Instance count: {}", ctx.server_count))],
        vec![
            PostElement::text(format!("Environment: {}", ctx.group_names)),
            PostElement::link(DEPLOY_LINK_TEXT, link.clone()),
        ],
        vec![PostElement::text("Deploy detail: "), PostElement::link(DEPLOY_LINK_TEXT, link)],
        vec![PostElement::text(format!("Publisher: {}", ctx.username))],
    ];

    PostBody {
        title: ctx.event.status.title().to_string(),
        content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{applies::ApplyDBResponse, projects::ProjectDBResponse};
    use crate::notify::events::{DeployMode, DeployStatus, DeploymentEvent, FAILURE_TITLE, SUCCESS_TITLE};
    use serde_json::json;

    const APP_HOST: &str = "https://deploy.example";

    fn context(status: DeployStatus, commit_version: &str) -> NotificationContext {
        NotificationContext {
            event: DeploymentEvent::new(42, DeployMode::Branch, status, "release"),
            apply: ApplyDBResponse {
                id: 42,
                project_id: 7,
                user_id: 3,
                branch_name: "main".to_string(),
                commit_version: commit_version.to_string(),
            },
            project: ProjectDBResponse {
                id: 7,
                name: "checkout".to_string(),
                online_cluster: vec![1, 2],
            },
            server_count: 3,
            group_names: "prod,staging".to_string(),
            commit_message: "fix bug".to_string(),
            username: "alice".to_string(),
        }
    }

    #[test]
    fn test_end_to_end_rows() {
        let body = render(&context(DeployStatus::Success, ""), APP_HOST);

        assert_eq!(body.title, SUCCESS_TITLE);
        assert_eq!(body.content.len(), 7);
        assert_eq!(body.content[0], vec![PostElement::text("Service name: checkout")]);
        assert_eq!(body.content[1], vec![PostElement::text("Service version: main")]);
        assert_eq!(body.content[2], vec![PostElement::text("Commit message: fix bug")]);
        assert_eq!(body.content[3], vec![PostElement::text("Instance count: 3")]);
        assert_eq!(
            body.content[4],
            vec![
                PostElement::text("Environment: prod,staging"),
                PostElement::link("Deploy link", "https://deploy.example/deploy/deploy?id=42"),
            ]
        );
        assert_eq!(body.content[6], vec![PostElement::text("Publisher: alice")]);
    }

    #[test]
    fn test_failure_title() {
        let body = render(&context(DeployStatus::Failure, ""), APP_HOST);
        assert_eq!(body.title, FAILURE_TITLE);
    }

    #[test]
    fn test_commit_version_adds_second_cell() {
        let body = render(&context(DeployStatus::Success, "9f8e7d6"), APP_HOST);

        assert_eq!(
            body.content[1],
            vec![
                PostElement::text("Service version: 9f8e7d6"),
                PostElement::text("commitVersion:9f8e7d6"),
            ]
        );
    }

    #[test]
    fn test_detail_row_links_match_environment_row() {
        for commit_version in ["", "abc123"] {
            let body = render(&context(DeployStatus::Success, commit_version), APP_HOST);

            let environment = &body.content[4];
            let detail = &body.content[5];
            assert_eq!(environment.len(), 2);
            assert_eq!(detail.len(), 2);
            assert_eq!(detail[0], PostElement::text("Deploy detail: "));
            assert_eq!(detail[1].tag, Tag::Link);
            assert_eq!(detail[1].href, environment[1].href);
        }
    }

    #[test]
    fn test_deploy_link_trailing_slash() {
        assert_eq!(deploy_link("https://deploy.example/", 5), "https://deploy.example/deploy/deploy?id=5");
        assert_eq!(deploy_link("http://10.0.0.1:8878", 5), "http://10.0.0.1:8878/deploy/deploy?id=5");
    }

    #[test]
    fn test_signed_post_wire_format() {
        let body = PostBody {
            title: SUCCESS_TITLE.to_string(),
            content: vec![vec![
                PostElement::text("Deploy detail: "),
                PostElement::link("Deploy link", "https://deploy.example/deploy/deploy?id=42"),
            ]],
        };

        let message = FeishuMessage::signed_post(body, 1_700_000_000, "test-secret").unwrap();
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value,
            json!({
                "msg_type": "post",
                "content": { "post": { "zh_cn": {
                    "title": "Deploy succeeded",
                    "content": [[
                        { "tag": "text", "text": "Deploy detail: " },
                        { "tag": "a", "text": "Deploy link", "href": "https://deploy.example/deploy/deploy?id=42" }
                    ]]
                }}},
                "timestamp": "1700000000",
                "sign": "mbm4Y4oluIPQ00qlBIhX8vAZ0EKv3nw0LuTb91jPL84="
            })
        );
    }
}

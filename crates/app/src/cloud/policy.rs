//! Bucket policy documents.

use serde::Serialize;

use crate::ids::ProviderResourceId;

/// Policy language version understood by the storage provider.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Object and bucket actions granted to a scoped identity on its own bucket.
pub const BUCKET_ACTIONS: [&str; 40] = [
    "s3:AbortMultipartUpload",
    "s3:DeleteObject",
    "s3:DeleteObjectVersion",
    "s3:GetAccelerateConfiguration",
    "s3:GetBucketAcl",
    "s3:GetBucketCORS",
    "s3:GetBucketLocation",
    "s3:GetBucketLogging",
    "s3:GetBucketNotification",
    "s3:GetBucketVersioning",
    "s3:GetBucketWebsite",
    "s3:GetLifecycleConfiguration",
    "s3:GetObject",
    "s3:GetObjectAcl",
    "s3:GetObjectTorrent",
    "s3:GetObjectVersion",
    "s3:GetObjectVersionAcl",
    "s3:GetObjectVersionTorrent",
    "s3:GetReplicationConfiguration",
    "s3:ListBucket",
    "s3:ListBucketMultipartUploads",
    "s3:ListBucketVersions",
    "s3:ListMultipartUploadParts",
    "s3:PutAccelerateConfiguration",
    "s3:PutBucketAcl",
    "s3:PutBucketCORS",
    "s3:PutBucketLogging",
    "s3:PutBucketNotification",
    "s3:PutBucketRequestPayment",
    "s3:PutBucketTagging",
    "s3:PutBucketVersioning",
    "s3:PutBucketWebsite",
    "s3:PutLifecycleConfiguration",
    "s3:PutReplicationConfiguration",
    "s3:PutObject",
    "s3:PutObjectAcl",
    "s3:PutObjectVersionAcl",
    "s3:ReplicateDelete",
    "s3:ReplicateObject",
    "s3:RestoreObject",
];

/// Resource policy document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    version: &'static str,
    id: String,
    statement: Vec<Statement>,
}

/// Policy statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    sid: String,
    effect: Effect,
    principal: Principal,
    action: Vec<String>,
    resource: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Principal {
    #[serde(rename = "AWS")]
    aws: Vec<String>,
}

impl PolicyDocument {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            version: POLICY_VERSION,
            id: id.into(),
            statement: Vec::new(),
        }
    }

    /// Grant `user_arn`, and only it, [`BUCKET_ACTIONS`] on `bucket` and its objects.
    #[must_use]
    pub fn bucket_access(resource: &ProviderResourceId, bucket: &str, user_arn: &str) -> Self {
        Self::new(format!("Policy{resource}")).with_statement(
            Statement::new(format!("Stmt{resource}"), Effect::Allow)
                .with_principal(user_arn)
                .with_actions(BUCKET_ACTIONS)
                .with_resource(format!("arn:aws:s3:::{bucket}"))
                .with_resource(format!("arn:aws:s3:::{bucket}/*")),
        )
    }

    #[must_use]
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statement.push(statement);
        self
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statement
    }

    /// Serialize to the provider's JSON policy format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Statement {
    pub fn new(sid: impl Into<String>, effect: Effect) -> Self {
        Self {
            sid: sid.into(),
            effect,
            principal: Principal::default(),
            action: Vec::new(),
            resource: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_principal(mut self, arn: impl Into<String>) -> Self {
        self.principal.aws.push(arn.into());
        self
    }

    #[must_use]
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action.extend(actions.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_resource(mut self, arn: impl Into<String>) -> Self {
        self.resource.push(arn.into());
        self
    }

    #[must_use]
    pub fn principals(&self) -> &[String] {
        &self.principal.aws
    }

    #[must_use]
    pub fn resources(&self) -> &[String] {
        &self.resource
    }
}

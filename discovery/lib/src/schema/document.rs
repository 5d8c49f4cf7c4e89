//! Wire-format types for discovery documents.
//!
//! Only the fields the client acts on are modelled; everything else in a
//! document is ignored on deserialization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A discovery document as published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryDocument {
    /// Document id, e.g. `drive:v3`.
    pub id: Option<String>,
    /// API name, e.g. `drive`.
    pub name: Option<String>,
    /// API version, e.g. `v3`.
    pub version: Option<String>,
    /// Root URL of the service, e.g. `https://www.googleapis.com/`.
    pub root_url: Option<String>,
    /// Path under the root URL, e.g. `drive/v3/`.
    pub service_path: Option<String>,
    /// Legacy combined base URL, used when `rootUrl` is absent.
    pub base_url: Option<String>,
    /// Parameters accepted by every method of the API.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterDocument>,
    /// Top-level resources.
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDocument>,
    /// Top-level methods.
    #[serde(default)]
    pub methods: BTreeMap<String, MethodDocument>,
}

/// A named group of methods and nested resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument {
    /// Nested resources.
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceDocument>,
    /// Methods of this resource.
    #[serde(default)]
    pub methods: BTreeMap<String, MethodDocument>,
}

/// One callable operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDocument {
    /// Unique method id, e.g. `drive.files.get`.
    pub id: Option<String>,
    /// URL template relative to the service path.
    pub path: Option<String>,
    /// HTTP verb.
    pub http_method: Option<String>,
    /// Description of this method.
    pub description: Option<String>,
    /// Required parameters, most significant first.
    #[serde(default)]
    pub parameter_order: Vec<String>,
    /// Every parameter the method accepts.
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterDocument>,
    /// Media upload configuration.
    pub media_upload: Option<MediaUploadDocument>,
}

/// Where a parameter is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Substituted into the URL template.
    Path,
    /// Sent in the query string.
    #[default]
    Query,
    /// Any other location; treated like `query`.
    #[serde(other)]
    Other,
}

/// A parameter declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDocument {
    /// Where the parameter is sent.
    #[serde(default)]
    pub location: ParameterLocation,
    /// JSON type name, e.g. `string`.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Whether the API requires the parameter.
    #[serde(default)]
    pub required: bool,
    /// Whether the parameter may appear more than once.
    #[serde(default)]
    pub repeated: bool,
    /// Description of the parameter.
    pub description: Option<String>,
}

/// Media upload configuration of a method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaUploadDocument {
    /// Supported upload protocols.
    pub protocols: Option<UploadProtocolsDocument>,
}

/// Upload protocols of a method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadProtocolsDocument {
    /// Single-request upload.
    pub simple: Option<UploadProtocolDocument>,
}

/// One upload protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadProtocolDocument {
    /// Upload URL template relative to the root URL.
    pub path: Option<String>,
}

impl MethodDocument {
    /// Returns the simple-upload path, if the method declares one.
    pub fn simple_upload_path(&self) -> Option<&str> {
        self.media_upload
            .as_ref()?
            .protocols
            .as_ref()?
            .simple
            .as_ref()?
            .path
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_nested_document() {
        let doc: DiscoveryDocument = serde_json::from_value(json!({
            "name": "drive",
            "rootUrl": "https://www.googleapis.com/",
            "servicePath": "drive/v3/",
            "title": "ignored",
            "resources": {
                "files": {
                    "methods": {
                        "create": {
                            "id": "drive.files.create",
                            "path": "files",
                            "httpMethod": "POST",
                            "mediaUpload": {
                                "protocols": {"simple": {"path": "/upload/drive/v3/files"}}
                            }
                        },
                        "get": {
                            "path": "files/{fileId}",
                            "httpMethod": "GET",
                            "parameterOrder": ["fileId"],
                            "parameters": {
                                "fileId": {"location": "path", "type": "string", "required": true}
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();

        let files = &doc.resources["files"];
        assert_eq!(
            files.methods["create"].simple_upload_path(),
            Some("/upload/drive/v3/files")
        );
        let get = &files.methods["get"];
        assert_eq!(get.simple_upload_path(), None);
        assert_eq!(get.parameter_order, vec!["fileId"]);
        assert_eq!(get.parameters["fileId"].location, ParameterLocation::Path);
        assert!(get.parameters["fileId"].required);
    }

    #[test]
    fn test_unknown_location_is_other() {
        let param: ParameterDocument =
            serde_json::from_value(json!({"location": "header"})).unwrap();
        assert_eq!(param.location, ParameterLocation::Other);
        let param: ParameterDocument = serde_json::from_value(json!({})).unwrap();
        assert_eq!(param.location, ParameterLocation::Query);
    }
}

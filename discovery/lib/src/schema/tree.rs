//! The validated, typed schema tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::document::{
    DiscoveryDocument, MethodDocument, ParameterDocument, ParameterLocation, ResourceDocument,
};
use crate::error::SchemaError;
use crate::method::RestMethod;
use crate::params::RESERVED_KEYS;
use crate::template;

/// A loaded discovery schema.
///
/// Immutable once built; URLs of every method, however deeply nested, are
/// resolved against the document's root URL and service path.
///
/// ## Examples
///
/// ```
/// use discovery::DiscoverySchema;
///
/// let schema = DiscoverySchema::from_json(r#"{
///     "rootUrl": "https://www.googleapis.com/",
///     "servicePath": "drive/v3/",
///     "resources": {
///         "files": {
///             "methods": {
///                 "get": {"path": "files/{fileId}", "httpMethod": "GET"}
///             }
///         }
///     }
/// }"#).unwrap();
///
/// let get = schema.root().resource("files").unwrap().method("get").unwrap();
/// assert_eq!(get.url_template(), "https://www.googleapis.com/drive/v3/files/{fileId}");
/// ```
#[derive(Debug, Clone)]
pub struct DiscoverySchema {
    name: Option<String>,
    version: Option<String>,
    base_url: String,
    root: ResourceNode,
}

/// URL prefixes captured from the document root and threaded through the walk.
struct RootUrls<'a> {
    root_url: &'a str,
    service_path: &'a str,
}

impl DiscoverySchema {
    /// Parses and loads a document from JSON text.
    ///
    /// ## Errors
    ///
    /// Returns an error if the text is not a valid discovery document.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: DiscoveryDocument = serde_json::from_str(json)?;
        Self::from_document(&document)
    }

    /// Loads a document from a JSON value.
    ///
    /// ## Errors
    ///
    /// Returns an error if the value is not a valid discovery document.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let document = DiscoveryDocument::deserialize(value)?;
        Self::from_document(&document)
    }

    /// Loads an already deserialized document.
    ///
    /// ## Errors
    ///
    /// Returns an error if the document has no root URL, a method lacks a
    /// path or has an unsupported verb, a URL template is malformed, or a
    /// method and a resource share a name.
    pub fn from_document(document: &DiscoveryDocument) -> Result<Self, SchemaError> {
        let urls = match (&document.root_url, &document.base_url) {
            (Some(root_url), _) => RootUrls {
                root_url,
                service_path: document.service_path.as_deref().unwrap_or_default(),
            },
            (None, Some(base_url)) => RootUrls {
                root_url: base_url,
                service_path: "",
            },
            (None, None) => {
                let scope = document.id.clone().unwrap_or_else(|| "document".to_string());
                return Err(SchemaError::missing_field("rootUrl", scope));
            }
        };

        let root = ResourceNode::build(
            &document.methods,
            &document.resources,
            &document.parameters,
            &urls,
            "",
        )?;

        Ok(Self {
            name: document.name.clone(),
            version: document.version.clone(),
            base_url: template::join_url(&[urls.root_url, urls.service_path]),
            root,
        })
    }

    /// Returns the API name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the API version.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Returns the root URL joined with the service path.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the top level of the resource tree.
    pub fn root(&self) -> &ResourceNode {
        &self.root
    }
}

/// One level of the resource tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceNode {
    methods: BTreeMap<String, Arc<MethodDescriptor>>,
    resources: BTreeMap<String, ResourceNode>,
}

impl ResourceNode {
    fn build(
        methods: &BTreeMap<String, MethodDocument>,
        resources: &BTreeMap<String, ResourceDocument>,
        shared_params: &BTreeMap<String, ParameterDocument>,
        urls: &RootUrls<'_>,
        scope: &str,
    ) -> Result<Self, SchemaError> {
        if let Some(name) = methods.keys().find(|name| resources.contains_key(*name)) {
            return Err(SchemaError::NameConflict {
                scope: scope.to_string(),
                name: name.clone(),
            });
        }

        let mut node = ResourceNode::default();
        for (name, method) in methods {
            let path = qualify(scope, name);
            let descriptor = MethodDescriptor::build(name, path, method, shared_params, urls)?;
            node.methods.insert(name.clone(), Arc::new(descriptor));
        }
        for (name, resource) in resources {
            let child = ResourceNode::build(
                &resource.methods,
                &resource.resources,
                shared_params,
                urls,
                &qualify(scope, name),
            )?;
            node.resources.insert(name.clone(), child);
        }
        Ok(node)
    }

    /// Returns a method at this level.
    pub fn method(&self, name: &str) -> Option<&Arc<MethodDescriptor>> {
        self.methods.get(name)
    }

    /// Returns a nested resource.
    pub fn resource(&self, name: &str) -> Option<&ResourceNode> {
        self.resources.get(name)
    }

    /// Iterates the methods at this level, sorted by name.
    pub fn methods(&self) -> impl Iterator<Item = (&str, &Arc<MethodDescriptor>)> {
        self.methods.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates the nested resources, sorted by name.
    pub fn resources(&self) -> impl Iterator<Item = (&str, &ResourceNode)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn qualify(scope: &str, name: &str) -> String {
    if scope.is_empty() {
        name.to_string()
    } else {
        format!("{scope}.{name}")
    }
}

/// A parameter as the client sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Where the parameter is sent.
    pub location: ParameterLocation,
    /// Whether the API marks it required.
    pub required: bool,
    /// Whether it may repeat in the query string.
    pub repeated: bool,
}

impl From<&ParameterDocument> for ParameterSpec {
    fn from(doc: &ParameterDocument) -> Self {
        Self {
            location: doc.location,
            required: doc.required,
            repeated: doc.repeated,
        }
    }
}

/// Everything needed to call one method.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDescriptor {
    id: String,
    name: String,
    path: String,
    description: Option<String>,
    http_method: RestMethod,
    url_template: String,
    upload_url_template: Option<String>,
    parameter_order: Vec<String>,
    parameters: BTreeMap<String, ParameterSpec>,
    path_params: Vec<String>,
    escapes: BTreeMap<String, String>,
}

impl MethodDescriptor {
    fn build(
        name: &str,
        path: String,
        method: &MethodDocument,
        shared_params: &BTreeMap<String, ParameterDocument>,
        urls: &RootUrls<'_>,
    ) -> Result<Self, SchemaError> {
        let relative = method
            .path
            .as_deref()
            .ok_or_else(|| SchemaError::missing_field("path", path.clone()))?;
        template::parse(relative)?;

        let verb = method.http_method.as_deref().unwrap_or("GET");
        let http_method = verb
            .parse::<RestMethod>()
            .map_err(|_| SchemaError::UnsupportedHttpMethod {
                method: path.clone(),
                http_method: verb.to_string(),
            })?;

        let upload_url_template = match method.simple_upload_path() {
            Some(upload) => {
                template::parse(upload)?;
                Some(template::join_url(&[urls.root_url, upload]))
            }
            None => None,
        };

        let mut parameters: BTreeMap<String, ParameterSpec> = shared_params
            .iter()
            .map(|(k, v)| (k.clone(), ParameterSpec::from(v)))
            .collect();
        parameters.extend(
            method
                .parameters
                .iter()
                .map(|(k, v)| (k.clone(), ParameterSpec::from(v))),
        );

        let path_params = parameters
            .iter()
            .filter(|(_, spec)| spec.location == ParameterLocation::Path)
            .map(|(k, _)| k.clone())
            .collect();

        let escapes = RESERVED_KEYS
            .iter()
            .map(|key| key.to_string())
            .chain(parameters.keys().cloned())
            .map(|key| (format!("{key}_"), key))
            .collect();

        Ok(Self {
            id: method.id.clone().unwrap_or_else(|| path.clone()),
            name: name.to_string(),
            path,
            description: method.description.clone(),
            http_method,
            url_template: template::join_url(&[urls.root_url, urls.service_path, relative]),
            upload_url_template,
            parameter_order: method.parameter_order.clone(),
            parameters,
            path_params,
            escapes,
        })
    }

    /// Returns the method id from the document, or the dotted path if the
    /// document has none.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the method's name within its resource.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the dotted path from the root, e.g. `files.get`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the HTTP verb.
    pub fn http_method(&self) -> RestMethod {
        self.http_method
    }

    /// Returns the absolute URL template.
    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Returns the absolute simple-upload URL template, if any.
    pub fn upload_url_template(&self) -> Option<&str> {
        self.upload_url_template.as_deref()
    }

    /// Returns the required parameters in `parameterOrder`.
    pub fn required_params(&self) -> &[String] {
        &self.parameter_order
    }

    /// Returns a parameter declaration.
    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.get(name)
    }

    /// Returns the names of parameters located in the URL path.
    pub fn path_params(&self) -> &[String] {
        &self.path_params
    }

    /// Returns the unescaped name for an escaped (`name_`) parameter key.
    pub fn unescape(&self, key: &str) -> Option<&str> {
        self.escapes.get(key).map(String::as_str)
    }

    /// Iterates the escape table as `(escaped, unescaped)` pairs.
    pub fn escapes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.escapes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drive() -> Value {
        json!({
            "id": "drive:v3",
            "name": "drive",
            "version": "v3",
            "rootUrl": "https://www.googleapis.com/",
            "servicePath": "drive/v3/",
            "parameters": {
                "key": {"location": "query", "type": "string"}
            },
            "resources": {
                "files": {
                    "methods": {
                        "get": {
                            "id": "drive.files.get",
                            "path": "files/{fileId}",
                            "httpMethod": "GET",
                            "parameterOrder": ["fileId"],
                            "parameters": {
                                "fileId": {"location": "path", "required": true},
                                "fields": {"location": "query"}
                            }
                        },
                        "create": {
                            "path": "files",
                            "httpMethod": "post",
                            "mediaUpload": {
                                "protocols": {"simple": {"path": "/upload/drive/v3/files"}}
                            }
                        }
                    },
                    "resources": {
                        "revisions": {
                            "methods": {
                                "list": {"path": "files/{fileId}/revisions", "httpMethod": "GET"}
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn test_loads_nested_methods_against_root_url() {
        let schema = DiscoverySchema::from_value(&drive()).unwrap();
        assert_eq!(schema.name(), Some("drive"));
        assert_eq!(schema.version(), Some("v3"));
        assert_eq!(schema.base_url(), "https://www.googleapis.com/drive/v3/");

        let files = schema.root().resource("files").unwrap();
        let list = files.resource("revisions").unwrap().method("list").unwrap();
        assert_eq!(list.path(), "files.revisions.list");
        assert_eq!(list.id(), "files.revisions.list");
        assert_eq!(
            list.url_template(),
            "https://www.googleapis.com/drive/v3/files/{fileId}/revisions"
        );
    }

    #[test]
    fn test_method_descriptor_details() {
        let schema = DiscoverySchema::from_value(&drive()).unwrap();
        let files = schema.root().resource("files").unwrap();

        let get = files.method("get").unwrap();
        assert_eq!(get.id(), "drive.files.get");
        assert_eq!(get.http_method(), RestMethod::Get);
        assert_eq!(get.required_params(), ["fileId"]);
        assert_eq!(get.path_params(), ["fileId"]);
        assert!(get.parameter("key").is_some());
        assert_eq!(get.upload_url_template(), None);

        let create = files.method("create").unwrap();
        assert_eq!(create.http_method(), RestMethod::Post);
        assert_eq!(
            create.upload_url_template(),
            Some("https://www.googleapis.com/upload/drive/v3/files")
        );
    }

    #[test]
    fn test_escape_table_covers_reserved_and_declared_names() {
        let schema = DiscoverySchema::from_value(&drive()).unwrap();
        let get = schema.root().resource("files").unwrap().method("get").unwrap();
        assert_eq!(get.unescape("resource_"), Some("resource"));
        assert_eq!(get.unescape("media_"), Some("media"));
        assert_eq!(get.unescape("fields_"), Some("fields"));
        assert_eq!(get.unescape("unknown_"), None);
        assert_eq!(get.unescape("fields"), None);
    }

    #[test]
    fn test_base_url_fallback() {
        let schema = DiscoverySchema::from_value(&json!({
            "baseUrl": "https://example.com/api/v1/",
            "methods": {"ping": {"path": "ping"}}
        }))
        .unwrap();
        let ping = schema.root().method("ping").unwrap();
        assert_eq!(ping.url_template(), "https://example.com/api/v1/ping");
        assert_eq!(ping.http_method(), RestMethod::Get);
    }

    #[test]
    fn test_rejects_method_resource_conflict() {
        let err = DiscoverySchema::from_value(&json!({
            "rootUrl": "https://example.com/",
            "resources": {
                "files": {
                    "methods": {"permissions": {"path": "p"}},
                    "resources": {"permissions": {}}
                }
            }
        }))
        .unwrap_err();
        let SchemaError::NameConflict { scope, name } = err else {
            panic!("expected a name conflict");
        };
        assert_eq!(scope, "files");
        assert_eq!(name, "permissions");
    }

    #[test]
    fn test_rejects_bad_documents() {
        let no_root = DiscoverySchema::from_value(&json!({"methods": {}}));
        assert!(matches!(no_root, Err(SchemaError::MissingField { field: "rootUrl", .. })));

        let bad_verb = DiscoverySchema::from_value(&json!({
            "rootUrl": "https://example.com/",
            "methods": {"x": {"path": "x", "httpMethod": "FETCH"}}
        }));
        assert!(matches!(bad_verb, Err(SchemaError::UnsupportedHttpMethod { .. })));

        let bad_template = DiscoverySchema::from_value(&json!({
            "rootUrl": "https://example.com/",
            "methods": {"x": {"path": "x/{id"}}
        }));
        assert!(matches!(bad_template, Err(SchemaError::InvalidTemplate { .. })));

        let no_path = DiscoverySchema::from_value(&json!({
            "rootUrl": "https://example.com/",
            "methods": {"x": {}}
        }));
        assert!(matches!(no_path, Err(SchemaError::MissingField { field: "path", .. })));

        assert!(matches!(
            DiscoverySchema::from_json("[1, 2]"),
            Err(SchemaError::InvalidDocument(_))
        ));
    }
}

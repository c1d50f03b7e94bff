//! Query descriptors and RPC operation names

/// One backend query resolved from a `<filter>` subtree.
///
/// `path` is the model path handed to the store, `filters` the residual key
/// leaves whose values were left empty by the client and which select returned
/// fields instead of constraining matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    /// Model path, e.g. `/sonic-vlan:sonic-vlan/VLAN/VLAN_LIST[name=Vlan100]`
    pub path: String,

    /// Residual filter leaf names in key order
    pub filters: Vec<String>,

    /// Model container the path was built from
    pub module: String,

    /// Inner container, when the filter named one
    pub container: Option<String>,

    /// List or leaf element under the container, when the filter named one
    pub element: Option<String>,
}

impl GetRequest {
    /// Descriptor addressing a whole model.
    pub fn model(module: impl Into<String>) -> Self {
        let module = module.into();
        Self {
            path: format!("/{module}:{module}"),
            filters: Vec::new(),
            module,
            container: None,
            element: None,
        }
    }

    /// Descriptor addressing a container inside a model.
    pub fn container(module: impl Into<String>, container: impl Into<String>) -> Self {
        let mut request = Self::model(module);
        let container = container.into();
        request.path.push('/');
        request.path.push_str(&container);
        request.container = Some(container);
        request
    }

    /// Descriptor addressing a list or leaf element inside a container.
    ///
    /// Predicates and filters are appended afterwards by the resolver.
    pub fn element(
        module: impl Into<String>,
        container: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        let mut request = Self::container(module, container);
        let element = element.into();
        request.path.push('/');
        request.path.push_str(&element);
        request.element = Some(element);
        request
    }

    /// Name of the list the residual filters apply to.
    pub fn list_name(&self) -> Option<&str> {
        self.element.as_deref()
    }

    /// Append a `[key=value]` predicate.
    pub fn push_predicate(&mut self, key: &str, value: &str) {
        self.path.push('[');
        self.path.push_str(key);
        self.path.push('=');
        self.path.push_str(value);
        self.path.push(']');
    }

    /// Key/value pairs of every predicate on the path, in path order.
    pub fn predicates(&self) -> Vec<(&str, &str)> {
        let mut predicates = Vec::new();
        let mut rest = self.path.as_str();
        while let Some(open) = rest.find('[') {
            let Some(close) = rest[open..].find(']') else { break };
            let body = &rest[open + 1..open + close];
            if let Some((key, value)) = body.split_once('=') {
                predicates.push((key, value));
            }
            rest = &rest[open + close + 1..];
        }
        predicates
    }
}

/// Operation named by the first child of an `<rpc>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Get,
    GetSchema,
    CloseSession,
    Unsupported(String),
}

impl Operation {
    /// Map an element local name to an operation.
    pub fn from_name(name: &str) -> Self {
        match name {
            "get" => Operation::Get,
            "get-schema" => Operation::GetSchema,
            "close-session" => Operation::CloseSession,
            other => Operation::Unsupported(other.to_string()),
        }
    }

    /// Operation name passed to the authenticator.
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Get => "get",
            Operation::GetSchema => "get-schema",
            Operation::CloseSession => "close-session",
            Operation::Unsupported(name) => name,
        }
    }
}

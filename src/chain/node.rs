use std::fmt;

use super::NodeId;

/// Unary function carried by a node.
pub type Transform<T> = Box<dyn Fn(T) -> T>;

/// A single-input, single-output unit of a chain.
///
/// A node without a transform is a pass-through: `run` copies `input` to
/// `output` unchanged.
pub struct Node<T> {
    label: String,
    input: T,
    output: T,
    transform: Option<Transform<T>>,
    upstream: Option<NodeId>,
}

impl<T: Clone + Default> Node<T> {
    pub fn new(label: impl Into<String>, transform: Option<Transform<T>>) -> Self {
        Self {
            label: label.into(),
            input: T::default(),
            output: T::default(),
            transform,
            upstream: None,
        }
    }

    /// `output = transform(input)`.
    pub fn run(&mut self) {
        let input = self.input.clone();
        self.output = match &self.transform {
            Some(f) => f(input),
            None => input,
        };
    }

    pub fn assign(&mut self, value: T) {
        self.input = value;
    }
}

impl<T> Node<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn input(&self) -> &T {
        &self.input
    }

    pub fn output(&self) -> &T {
        &self.output
    }

    pub fn upstream(&self) -> Option<NodeId> {
        self.upstream
    }

    pub fn is_passthrough(&self) -> bool {
        self.transform.is_none()
    }

    pub fn set_transform(&mut self, transform: Option<Transform<T>>) {
        self.transform = transform;
    }

    pub(super) fn set_upstream(&mut self, upstream: Option<NodeId>) {
        self.upstream = upstream;
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.label)
            .field("input", &self.input)
            .field("output", &self.output)
            .field("passthrough", &self.transform.is_none())
            .field("upstream", &self.upstream)
            .finish()
    }
}

use anyhow::Result;
use ndarray::{Array, IxDyn};

/// Model input/output tensor, wrapper over [`Array<f32, IxDyn>`]
#[derive(Debug, Clone, Default)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Ordered, named collection of tensors exchanged with the engine.
#[derive(Debug, Clone, Default)]
pub struct Xs {
    names: Vec<String>,
    values: Vec<X>,
}

impl From<X> for Xs {
    fn from(x: X) -> Self {
        Self {
            names: vec![String::new()],
            values: vec![x],
        }
    }
}

impl std::ops::Index<usize> for Xs {
    type Output = X;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl Xs {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push_kv(&mut self, name: &str, x: X) -> Result<()> {
        if self.names.iter().any(|n| n == name) {
            anyhow::bail!("Duplicate tensor name: {name}");
        }
        self.names.push(name.to_string());
        self.values.push(x);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, X> {
        self.values.iter()
    }
}

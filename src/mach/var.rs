use super::Val;
use crate::error;
use crate::lang::Error;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, Error>;

/// Scalar variable memory. Reads of unset names yield 0 or the empty
/// string by sigil; stores coerce to the sigil's type.
#[derive(Debug, Default)]
pub struct Var {
    vars: HashMap<String, Val>,
}

impl Var {
    pub fn new() -> Var {
        Var::default()
    }

    pub fn clear(&mut self) {
        self.vars.clear();
    }

    pub fn fetch(&self, name: &str) -> Val {
        match self.vars.get(name) {
            Some(value) => value.clone(),
            None => Val::default_for(name),
        }
    }

    pub fn store(&mut self, name: &str, value: Val) {
        self.vars
            .insert(name.to_string(), Val::coerced_for(name, value));
    }

    /// Remove and return the current binding. Used with `restore` to
    /// shadow-save parameters around user-function calls.
    pub fn take(&mut self, name: &str) -> Option<Val> {
        self.vars.remove(name)
    }

    pub fn restore(&mut self, name: &str, previous: Option<Val>) {
        match previous {
            Some(value) => {
                self.vars.insert(name.to_string(), value);
            }
            None => {
                self.vars.remove(name);
            }
        }
    }
}

/// Array memory. Arrays auto-allocate with eleven slots per dimension
/// (indices 0..=10) on first reference; DIM sets explicit sizes and fails
/// on a name that already exists. Elements live in a sparse map keyed by
/// row-major offset.
#[derive(Debug, Default)]
pub struct Arrays {
    arrays: HashMap<String, Array>,
}

#[derive(Debug)]
struct Array {
    sizes: Vec<usize>,
    elements: HashMap<usize, Val>,
}

impl Arrays {
    pub fn new() -> Arrays {
        Arrays::default()
    }

    pub fn clear(&mut self) {
        self.arrays.clear();
    }

    pub fn dimension(&mut self, name: &str, bounds: &[i32]) -> Result<()> {
        if self.arrays.contains_key(name) {
            return Err(error!(Runtime; "Array {} already dimensioned", name));
        }
        let sizes = bounds.iter().map(|&u| u.max(0) as usize + 1).collect();
        self.arrays.insert(
            name.to_string(),
            Array {
                sizes,
                elements: HashMap::new(),
            },
        );
        Ok(())
    }

    pub fn fetch(&mut self, name: &str, indices: &[i32]) -> Result<Val> {
        let offset = self.offset(name, indices)?;
        let array = self.arrays.get(name).unwrap();
        Ok(match array.elements.get(&offset) {
            Some(value) => value.clone(),
            None => Val::default_for(name),
        })
    }

    pub fn store(&mut self, name: &str, indices: &[i32], value: Val) -> Result<()> {
        let offset = self.offset(name, indices)?;
        let array = self.arrays.get_mut(name).unwrap();
        array.elements.insert(offset, Val::coerced_for(name, value));
        Ok(())
    }

    fn offset(&mut self, name: &str, indices: &[i32]) -> Result<usize> {
        let array = self
            .arrays
            .entry(name.to_string())
            .or_insert_with(|| Array {
                sizes: vec![11; indices.len()],
                elements: HashMap::new(),
            });
        if array.sizes.len() != indices.len() {
            return Err(error!(Runtime; "Array {} expects {} dimensions", name, array.sizes.len()));
        }
        let mut offset = 0;
        let mut stride = 1;
        for (&index, &size) in indices.iter().zip(&array.sizes).rev() {
            if index < 0 || index as usize >= size {
                return Err(error!(Runtime; "Index out of range for {}", name));
            }
            offset += index as usize * stride;
            stride *= size;
        }
        Ok(offset)
    }
}

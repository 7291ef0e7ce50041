use indexmap::IndexMap;

use crate::errors::RuntimeError;

use super::system_vars::SYSTEM_VARIABLES;
use super::value::Value;

/// A scope entry. Globals seeded without a default start `Pending` and
/// become `Initialized(Null)` on first read.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Pending,
    Initialized(Value),
}

/// Frame 0 holds `$`-prefixed globals; later frames hold locals, innermost last.
#[derive(Debug)]
pub struct Scope {
    frames: Vec<IndexMap<String, Slot>>,
    last_error: Option<String>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        let mut globals = IndexMap::new();
        for var in SYSTEM_VARIABLES {
            let slot = match var.initial_value() {
                Some(value) => Slot::Initialized(value),
                None => Slot::Pending,
            };
            globals.insert(var.name.to_string(), slot);
        }
        Self {
            frames: vec![globals, IndexMap::new()],
            last_error: None,
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(IndexMap::new());
    }

    /// Drops the innermost local frame; the outermost local frame stays.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 2 {
            self.frames.pop();
        }
    }

    pub fn get_local(&self, name: &str) -> Result<Value, RuntimeError> {
        for frame in self.frames[1..].iter().rev() {
            if let Some(Slot::Initialized(value)) = frame.get(name) {
                return Ok(value.clone());
            }
        }
        Err(RuntimeError::UninitializedVariable(name.to_string()))
    }

    pub fn has_local(&self, name: &str) -> bool {
        self.frames[1..]
            .iter()
            .any(|frame| matches!(frame.get(name), Some(Slot::Initialized(_))))
    }

    pub fn set_local(&mut self, name: &str, value: Value) {
        let depth = self.frames.len();
        let target = (1..depth)
            .rev()
            .find(|index| self.frames[*index].contains_key(name))
            .unwrap_or(depth - 1);
        self.frames[target].insert(name.to_string(), Slot::Initialized(value));
    }

    /// Reads a global, null-initializing it when it was never assigned.
    pub fn get_global(&mut self, name: &str) -> Value {
        let key = global_key(name);
        let slot = self.frames[0].entry(key).or_insert(Slot::Pending);
        match slot {
            Slot::Initialized(value) => value.clone(),
            Slot::Pending => {
                *slot = Slot::Initialized(Value::Null);
                Value::Null
            }
        }
    }

    pub fn peek_global(&self, name: &str) -> Option<&Value> {
        match self.frames[0].get(&global_key(name)) {
            Some(Slot::Initialized(value)) => Some(value),
            _ => None,
        }
    }

    pub fn set_global(&mut self, name: &str, value: Value) {
        self.frames[0].insert(global_key(name), Slot::Initialized(value));
    }

    /// Dispatches on the `$` sigil.
    pub fn get(&mut self, name: &str) -> Result<Value, RuntimeError> {
        if name.starts_with('$') {
            Ok(self.get_global(name))
        } else {
            self.get_local(name)
        }
    }

    pub fn set(&mut self, name: &str, value: Value) {
        if name.starts_with('$') {
            self.set_global(name, value);
        } else {
            self.set_local(name, value);
        }
    }

    pub fn globals(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.frames[0].iter().map(|(name, slot)| (name.as_str(), slot))
    }

    pub fn locals(&self) -> Vec<(String, Value)> {
        let mut seen = IndexMap::new();
        for frame in &self.frames[1..] {
            for (name, slot) in frame {
                if let Slot::Initialized(value) = slot {
                    seen.insert(name.clone(), value.clone());
                }
            }
        }
        seen.into_iter().collect()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_last_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }
}

pub fn global_key(name: &str) -> String {
    if name.starts_with('$') {
        name.to_string()
    } else {
        format!("${}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locals_must_be_assigned_before_read() {
        let scope = Scope::new();
        assert_eq!(
            scope.get_local("x"),
            Err(RuntimeError::UninitializedVariable("x".to_string()))
        );
    }

    #[test]
    fn globals_null_initialize_on_first_read() {
        let mut scope = Scope::new();
        assert!(scope.peek_global("$fresh").is_none());
        assert_eq!(scope.get_global("$fresh"), Value::Null);
        assert_eq!(scope.peek_global("fresh"), Some(&Value::Null));
    }

    #[test]
    fn system_variables_are_seeded() {
        let mut scope = Scope::new();
        assert_eq!(
            scope.get_global("$jitterbit.scripting.while.max_iterations"),
            Value::Number(50000.0)
        );
        let pending = scope
            .globals()
            .find(|(name, _)| *name == "$jitterbit.operation.name")
            .map(|(_, slot)| slot.clone());
        assert_eq!(pending, Some(Slot::Pending));
    }

    #[test]
    fn inner_frame_updates_outer_binding() {
        let mut scope = Scope::new();
        scope.set_local("x", Value::Number(1.0));
        scope.push_frame();
        scope.set_local("x", Value::Number(2.0));
        scope.set_local("y", Value::Number(3.0));
        scope.pop_frame();
        assert_eq!(scope.get_local("x"), Ok(Value::Number(2.0)));
        assert!(!scope.has_local("y"));
    }
}

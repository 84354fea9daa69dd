use std::collections::BTreeMap;

/// Step rule applied to a parameter on every write.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Constraint {
    #[default]
    None,
    /// Coerce to the nearest odd integer (kernel sizes).
    Odd,
    /// Arbitrary coercion, applied before bounds clamping.
    Custom(fn(f64) -> f64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSpec {
    pub min: f64,
    pub max: f64,
    pub constraint: Constraint,
}

impl ParamSpec {
    /// Coerce `value` to the nearest value satisfying constraint and bounds.
    pub fn coerce(&self, value: f64) -> f64 {
        let v = match self.constraint {
            Constraint::None => value,
            Constraint::Odd => nearest_odd(value),
            Constraint::Custom(f) => f(value),
        };
        let v = v.clamp(self.min, self.max);
        // Clamping can land on an even bound; step back inside the range.
        if matches!(self.constraint, Constraint::Odd) && (v.round() as i64).rem_euclid(2) == 0 {
            snap_odd_into(v.round(), self.min, self.max)
        } else {
            v
        }
    }
}

fn nearest_odd(value: f64) -> f64 {
    let rounded = value.round();
    if (rounded as i64).rem_euclid(2) == 1 {
        rounded
    } else if value >= rounded {
        rounded + 1.0
    } else {
        rounded - 1.0
    }
}

fn snap_odd_into(v: f64, min: f64, max: f64) -> f64 {
    if v + 1.0 <= max {
        v + 1.0
    } else if v - 1.0 >= min {
        v - 1.0
    } else {
        v
    }
}

/// Named numeric parameters with per-entry bounds and step constraints.
///
/// Writes never fail: a value violating its constraint or bounds is coerced
/// to the nearest valid one. Unregistered names are stored verbatim, the
/// way scratch values (selector indices, scroll positions) ride alongside
/// tuning parameters.
#[derive(Debug, Default)]
pub struct ParameterSet {
    values: BTreeMap<String, f64>,
    specs: BTreeMap<String, ParamSpec>,
    changed: bool,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with bounds and a constraint. Idempotent:
    /// re-registering updates the spec but keeps the current value when it
    /// still satisfies the new spec (it is re-coerced otherwise).
    pub fn register(&mut self, name: &str, min: f64, max: f64, initial: f64, constraint: Constraint) {
        let spec = ParamSpec {
            min,
            max,
            constraint,
        };
        match self.values.get(name).copied() {
            Some(current) => {
                let coerced = spec.coerce(current);
                if coerced != current {
                    self.values.insert(name.to_string(), coerced);
                    self.changed = true;
                }
            }
            None => {
                self.values.insert(name.to_string(), spec.coerce(initial));
            }
        }
        self.specs.insert(name.to_string(), spec);
    }

    /// Store a value, coerced to the registered constraint and bounds, and
    /// raise the change flag the session's recompute listener runs off.
    /// Returns the coerced value.
    pub fn set(&mut self, name: &str, value: f64) -> f64 {
        let coerced = match self.specs.get(name) {
            Some(spec) => spec.coerce(value),
            None => value,
        };
        if coerced != value {
            tracing::debug!(name, value, coerced, "parameter coerced");
        }
        self.values.insert(name.to_string(), coerced);
        self.changed = true;
        coerced
    }

    /// Current value, or `default` when the name is absent.
    pub fn get(&self, name: &str, default: f64) -> f64 {
        self.values.get(name).copied().unwrap_or(default)
    }

    pub fn spec(&self, name: &str) -> Option<&ParamSpec> {
        self.specs.get(name)
    }

    /// Current name → value mapping, as handed to processing functions.
    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Consume the change flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }
}

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Gate {
    permits: u32,
    available: u32,
}

/// Registry of named, non-blocking counting semaphores.
///
/// Cloning yields another handle onto the same registry, which is how nodes of different tree
/// instances coordinate access to a resource living outside their trees. Names that were never
/// [`define`](Self::define)d are created on first use with a single permit.
#[derive(Debug, Clone, Default)]
pub struct Semaphores {
    gates: Rc<RefCell<BTreeMap<String, Gate>>>,
}

impl Semaphores {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)defines `name` with `permits` permits, all of them available.
    pub fn define(&self, name: impl Into<String>, permits: u32) {
        self.gates.borrow_mut().insert(
            name.into(),
            Gate {
                permits,
                available: permits,
            },
        );
    }

    pub fn try_acquire(&self, name: &str) -> bool {
        let mut gates = self.gates.borrow_mut();
        let gate = gates.entry(name.to_owned()).or_insert(Gate {
            permits: 1,
            available: 1,
        });
        if gate.available == 0 {
            return false;
        }
        gate.available -= 1;
        true
    }

    /// Returns a permit. Returns `false` (and changes nothing) when every permit is already available.
    pub fn release(&self, name: &str) -> bool {
        let mut gates = self.gates.borrow_mut();
        match gates.get_mut(name) {
            Some(gate) if gate.available < gate.permits => {
                gate.available += 1;
                true
            }
            _ => {
                tracing::warn!(semaphore = name, "release without a matching acquire");
                false
            }
        }
    }

    pub fn available(&self, name: &str) -> Option<u32> {
        self.gates.borrow().get(name).map(|gate| gate.available)
    }

    pub fn permits(&self, name: &str) -> Option<u32> {
        self.gates.borrow().get(name).map(|gate| gate.permits)
    }

    /// `true` when both handles point at the same registry.
    pub fn same_registry(&self, other: &Semaphores) -> bool {
        Rc::ptr_eq(&self.gates, &other.gates)
    }
}

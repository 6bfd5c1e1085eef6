use crate::console;
use crate::storage::KeyValueStore;

pub const PREMIUM_KEY: &str = "premium_active";

/// Persisted point multiplier toggle. Only the stored string `"true"` reads
/// as active.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PremiumFlag {
    active: bool,
}

impl PremiumFlag {
    pub fn load(store: &impl KeyValueStore) -> Self {
        Self {
            active: store.get(PREMIUM_KEY).as_deref() == Some("true"),
        }
    }

    pub fn is_active(self) -> bool {
        self.active
    }

    pub fn multiplier(self) -> u32 {
        if self.active { 2 } else { 1 }
    }

    pub fn toggle(&mut self, store: &impl KeyValueStore) -> bool {
        self.active = !self.active;
        let raw = if self.active { "true" } else { "false" };
        if let Err(err) = store.set(PREMIUM_KEY, raw) {
            console::warn(&format!("could not save premium flag: {err}"));
        }
        self.active
    }

    pub fn status_text(self) -> &'static str {
        if self.active { "Premium: ON" } else { "Premium: OFF" }
    }

    pub fn status_color(self) -> &'static str {
        if self.active { "#f1c40f" } else { "#2ecc71" }
    }

    pub fn button_label(self) -> &'static str {
        if self.active {
            "🔒 Deactivate Premium"
        } else {
            "🔓 Activate Premium"
        }
    }

    pub fn button_background(self) -> &'static str {
        if self.active {
            "linear-gradient(135deg, #27ae60, #2ecc71)"
        } else {
            "linear-gradient(135deg, #f1c40f, #e67e22)"
        }
    }

    pub fn button_shadow(self) -> &'static str {
        if self.active {
            "0 6px 18px rgba(39,174,96,0.25)"
        } else {
            "none"
        }
    }

    pub fn announcement(self) -> &'static str {
        if self.active {
            "Premium activated! Double points enabled."
        } else {
            "Premium deactivated."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn only_literal_true_is_active() {
        for (raw, expected) in [("true", true), ("false", false), ("TRUE", false), ("1", false)] {
            let store = MemoryStore::with(&[(PREMIUM_KEY, raw)]);
            assert_eq!(PremiumFlag::load(&store).is_active(), expected, "{raw}");
        }
        assert!(!PremiumFlag::load(&MemoryStore::default()).is_active());
    }

    #[test]
    fn toggle_twice_restores_multiplier() {
        let store = MemoryStore::default();
        let mut flag = PremiumFlag::load(&store);
        assert_eq!(flag.multiplier(), 1);

        assert!(flag.toggle(&store));
        assert_eq!(flag.multiplier(), 2);
        assert_eq!(store.get(PREMIUM_KEY).as_deref(), Some("true"));

        assert!(!flag.toggle(&store));
        assert_eq!(flag.multiplier(), 1);
        assert_eq!(store.get(PREMIUM_KEY).as_deref(), Some("false"));
    }

    #[test]
    fn failed_write_still_flips_in_memory() {
        let store = MemoryStore::default();
        store.fail_writes(true);
        let mut flag = PremiumFlag::default();
        assert!(flag.toggle(&store));
        assert!(flag.is_active());
        assert_eq!(store.get(PREMIUM_KEY), None);
    }

    #[test]
    fn announcement_follows_resulting_state() {
        let mut flag = PremiumFlag::default();
        assert_eq!(flag.announcement(), "Premium deactivated.");
        flag.toggle(&MemoryStore::default());
        assert_eq!(flag.announcement(), "Premium activated! Double points enabled.");
        assert_eq!(flag.status_text(), "Premium: ON");
    }
}

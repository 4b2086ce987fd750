/// Request-generation token for one network-backed state slot.
///
/// Every issued request records the slot's generation; a completed request
/// applies its result only when its generation still matches, so a stale
/// response can never overwrite newer state. `in_flight` is the observable
/// busy flag (`saving`, `analyzing`, `loading`) the UI keys off.
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSlot {
    generation: u64,
    in_flight: bool,
}

impl RequestSlot {
    /// Start a new request: bumps the generation (invalidating anything still
    /// in flight) and returns the token to attach to the request.
    pub fn begin(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = true;
        self.generation
    }

    /// Offer a completed request's token. Returns true when the result is
    /// current and should be applied; clears `in_flight` only in that case.
    pub fn accept(&mut self, generation: u64) -> bool {
        if generation == self.generation {
            self.in_flight = false;
            true
        } else {
            false
        }
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slot_is_idle() {
        let slot = RequestSlot::default();
        assert!(!slot.in_flight());
    }

    #[test]
    fn begin_then_accept_clears_in_flight() {
        let mut slot = RequestSlot::default();
        let token = slot.begin();
        assert!(slot.in_flight());
        assert!(slot.accept(token));
        assert!(!slot.in_flight());
    }

    #[test]
    fn stale_token_is_rejected_and_flag_stays() {
        let mut slot = RequestSlot::default();
        let stale = slot.begin();
        let current = slot.begin();
        assert!(!slot.accept(stale));
        assert!(slot.in_flight(), "newer request is still pending");
        assert!(slot.accept(current));
        assert!(!slot.in_flight());
    }

    #[test]
    fn accept_twice_is_harmless() {
        let mut slot = RequestSlot::default();
        let token = slot.begin();
        assert!(slot.accept(token));
        // A duplicate completion for the same token still matches but the
        // slot is already idle.
        assert!(slot.accept(token));
        assert!(!slot.in_flight());
    }
}

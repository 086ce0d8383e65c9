use crate::{config::ConfigState, rng::Prng};

/// Gilbert-Elliott-style loss model.
///
/// Two states, one uniform draw per capacity exit. `Normal` drops with
/// `prob_start_bursting` and enters `Bursting` on a drop; `Bursting` drops
/// with `prob_loss_bursting` and returns to `Normal` on a non-drop. With
/// the Bernoulli sentinel configured, the chain is pinned to `Normal` and
/// each packet is an independent trial.
#[derive(Debug, Default)]
pub(crate) struct LossModel {
    state: LossState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derivative::Derivative)]
#[derivative(Default)]
enum LossState {
    #[derivative(Default)]
    Normal,
    Bursting,
}

impl LossModel {
    /// Decide the fate of one packet leaving the capacity stage.
    ///
    /// Returns `true` if the packet is to vanish. Dropped packets leave no
    /// delivery record.
    pub(crate) fn should_drop(&mut self, state: &ConfigState, rng: &mut Prng) -> bool {
        let draw = rng.rand_f64();
        if state.config.avg_burst_loss_length == -1 {
            return draw < state.prob_start_bursting;
        }
        match self.state {
            LossState::Normal => {
                if draw < state.prob_start_bursting {
                    self.state = LossState::Bursting;
                    true
                } else {
                    false
                }
            }
            LossState::Bursting => {
                if draw < state.prob_loss_bursting {
                    true
                } else {
                    self.state = LossState::Normal;
                    false
                }
            }
        }
    }
}

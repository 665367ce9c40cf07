//! Discounted return estimation.

/// Computes the discounted return of every step of an episode.
///
/// `rewards` and `not_dones` are parallel arrays; `not_dones[t]` is `1.0`
/// while the episode continues past step `t` and `0.0` on an environment
/// terminal. The returns satisfy the backward recursion
///
/// `R[t] = rewards[t] + gamma * R[t+1] * not_dones[t]`
///
/// with `R` past the last step taken as zero. The mask stops the
/// accumulation at terminals, so a reward after stepping into a wall is not
/// bootstrapped into the steps of the next life. A budget-truncated episode
/// keeps its last mask at `1.0`, which only matters when episodes are
/// concatenated; for a single episode the recursion starts from zero either
/// way.
///
/// # Panics
///
/// Panics if the two arrays differ in length.
pub fn discounted_returns(rewards: &[f32], not_dones: &[f32], gamma: f32) -> Vec<f32> {
    assert_eq!(
        rewards.len(),
        not_dones.len(),
        "rewards and not_dones must be parallel arrays"
    );

    let mut returns = vec![0f32; rewards.len()];
    let mut acc = 0f32;
    for t in (0..rewards.len()).rev() {
        acc = rewards[t] + gamma * acc * not_dones[t];
        returns[t] = acc;
    }
    returns
}

#[cfg(test)]
mod tests {
    use super::discounted_returns;

    #[test]
    fn test_masked_returns() {
        let returns = discounted_returns(&[1.0, 1.0, 1.0], &[1.0, 1.0, 0.0], 0.5);
        assert_eq!(returns, vec![1.75, 1.5, 1.0]);
    }

    #[test]
    fn test_single_terminal_step() {
        let returns = discounted_returns(&[-1.0], &[0.0], 0.99);
        assert_eq!(returns, vec![-1.0]);
    }

    #[test]
    fn test_no_terminal() {
        // With all masks 1, R[t] = sum_k gamma^k * r[t+k].
        let returns = discounted_returns(&[1.0, 2.0, 4.0], &[1.0, 1.0, 1.0], 0.5);
        assert_eq!(returns, vec![1.0 + 0.5 * 2.0 + 0.25 * 4.0, 2.0 + 0.5 * 4.0, 4.0]);
    }

    #[test]
    fn test_empty() {
        assert!(discounted_returns(&[], &[], 0.9).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_length_mismatch() {
        discounted_returns(&[1.0, 1.0], &[1.0], 0.9);
    }
}

/// Walks `predecessor` back from `destination` and returns the hops from
/// `source` to `destination` inclusive. Returns an empty path when the chain
/// does not reach `source`.
pub fn reconstruct_path(predecessor: &[Option<u32>], source: u32, destination: u32) -> Vec<u32> {
    let mut hops = vec![destination];
    let mut current = destination;

    while current != source {
        // A chain longer than the table means a cycle.
        if hops.len() > predecessor.len() {
            return Vec::new();
        }
        match predecessor.get(current as usize).copied().flatten() {
            Some(previous) => {
                hops.push(previous);
                current = previous;
            }
            None => return Vec::new(),
        }
    }

    hops.reverse();
    hops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_predecessors_back_to_source() {
        // 1 -> 2 -> 4, 3 unreachable
        let predecessor = vec![None, None, Some(1), None, Some(2)];
        assert_eq!(reconstruct_path(&predecessor, 1, 4), vec![1, 2, 4]);
        assert_eq!(reconstruct_path(&predecessor, 1, 2), vec![1, 2]);
        assert_eq!(reconstruct_path(&predecessor, 1, 1), vec![1]);
        assert!(reconstruct_path(&predecessor, 1, 3).is_empty());
    }

    #[test]
    fn cyclic_chain_yields_empty_path() {
        let predecessor = vec![None, None, Some(3), Some(2)];
        assert!(reconstruct_path(&predecessor, 1, 2).is_empty());
    }
}

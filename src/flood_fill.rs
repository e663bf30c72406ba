use std::collections::HashSet;
use std::hash::Hash;

/// Collect every node reachable from `start` through `neighbors`, visiting
/// only nodes that pass `accept`.
///
/// Uses an explicit stack, so deep regions cannot overflow the call stack.
/// `start` itself is always visited. Order follows depth-first discovery.
pub fn flood_fill<T, N, I, A>(start: T, mut neighbors: N, mut accept: A) -> Vec<T>
where
    T: Copy + Eq + Hash,
    N: FnMut(&T) -> I,
    I: IntoIterator<Item = T>,
    A: FnMut(&T) -> bool,
{
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![start];
    visited.insert(start);

    while let Some(node) = stack.pop() {
        order.push(node);
        for next in neighbors(&node) {
            if !visited.contains(&next) && accept(&next) {
                visited.insert(next);
                stack.push(next);
            }
        }
    }

    order
}

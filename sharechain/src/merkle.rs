use bitcrypto::{dhash256, SHA256D};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

#[inline]
fn concat(a: &SHA256D, b: &SHA256D) -> [u8; 64] {
	let mut result = [0; 64];
	result[0..32].copy_from_slice(&a[..]);
	result[32..64].copy_from_slice(&b[..]);
	result
}

/// Merkle tree node hash.
pub fn merkle_node_hash(left: &SHA256D, right: &SHA256D) -> SHA256D {
	dhash256(&concat(left, right))
}

/// Calculates the root of the merkle tree
/// https://en.bitcoin.it/wiki/Protocol_documentation#Merkle_Trees
///
/// An empty list hashes to all zeroes.
pub fn merkle_root(hashes: &[SHA256D]) -> SHA256D {
	if hashes.is_empty() {
		return SHA256D::default();
	}
	if hashes.len() == 1 {
		return hashes[0];
	}

	let mut row = Vec::with_capacity(hashes.len() / 2);
	let mut i = 0;
	while i + 1 < hashes.len() {
		row.push((&hashes[i], &hashes[i + 1]));
		i += 2
	}

	// duplicate the last element if len is not even
	if hashes.len() % 2 == 1 {
		let last = &hashes[hashes.len() - 1];
		row.push((last, last));
	}

	// only compute in parallel if there is enough work to benefit from it
	let res: Vec<_> = if row.len() > 250 {
		row.par_iter().map(|x| merkle_node_hash(x.0, x.1)).collect()
	} else {
		row.iter().map(|x| merkle_node_hash(x.0, x.1)).collect()
	};
	merkle_root(&res)
}

/// Sibling hashes along the path from `hashes[index]` to the root. Given the
/// leaf and this link, `aggregate_link` re-derives the root without the rest
/// of the tree.
pub fn merkle_link(hashes: &[SHA256D], index: usize) -> Vec<SHA256D> {
	assert!(index == 0 || index < hashes.len());

	let mut link = Vec::new();
	let mut layer = hashes.to_vec();
	let mut i = index;

	while layer.len() > 1 {
		if layer.len() % 2 == 1 {
			let last = layer[layer.len() - 1];
			layer.push(last);
		}

		link.push(layer[i ^ 1]);

		layer = layer.chunks(2).map(|pair| merkle_node_hash(&pair[0], &pair[1])).collect();
		i /= 2;
	}

	link
}

/// Folds a leaf up the tree along a link produced for index 0: the running
/// hash is always the left branch, the sibling the right one.
pub fn aggregate_link(leaf: SHA256D, link: &[SHA256D]) -> SHA256D {
	link.iter().fold(leaf, |current, sibling| merkle_node_hash(&current, sibling))
}

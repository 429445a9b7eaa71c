//! Ghost-plane exchange between linearly adjacent partitions.
//!
//! Two paired exchanges per sweep, both on the buffer the stencil is about to
//! read:
//!  1. top owned plane (`ghost - 2`) goes up, plane `0` is filled from below;
//!  2. bottom owned plane (`1`) goes down, plane `ghost - 1` is filled from above.
//!
//! A missing neighbour turns its half into a no-op and leaves that ghost plane
//! as it was. Both exchanges have completed when [`exchange_halo`] returns.

use crate::algs::communicator::{CommTag, Communicator};
use crate::algs::wire::{cast_slice, cast_slice_mut};
use crate::decomposition::neighbors::NeighborLinks;
use crate::field::Scalar;
use crate::field::scalar_field::ScalarField;
use crate::field::storage::Storage;
use crate::sor_error::SorError;

/// Planes moved by one call to [`exchange_halo`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HaloStats {
    pub sent_planes: usize,
    pub received_planes: usize,
}

/// Pack/unpack buffers reused across sweeps, one plane each.
#[derive(Clone, Debug)]
pub struct HaloScratch<T> {
    send: Vec<T>,
    recv: Vec<T>,
}

impl<T: Scalar> HaloScratch<T> {
    pub fn new(plane_len: usize) -> Self {
        Self {
            send: vec![T::zero(); plane_len],
            recv: vec![T::zero(); plane_len],
        }
    }
}

struct PlaneSwap {
    send_plane: usize,
    dest: Option<usize>,
    recv_plane: usize,
    source: Option<usize>,
    tag: CommTag,
}

/// Refresh both ghost planes of `field` from the neighbours in `links`.
///
/// # Errors
/// Any transport failure; the caller must abort the run, since continuing
/// would sweep over stale ghosts.
pub fn exchange_halo<T, S, C>(
    field: &mut ScalarField<T, S>,
    links: &NeighborLinks,
    comm: &C,
    scratch: &mut HaloScratch<T>,
) -> Result<HaloStats, SorError>
where
    T: Scalar,
    S: Storage<T>,
    C: Communicator + ?Sized,
{
    let ghost = field.layout().ghost_extent();
    if scratch.send.len() != field.layout().plane_len() {
        *scratch = HaloScratch::new(field.layout().plane_len());
    }
    let swaps = [
        PlaneSwap {
            send_plane: ghost - 2,
            dest: links.up,
            recv_plane: 0,
            source: links.down,
            tag: CommTag::HALO_UP,
        },
        PlaneSwap {
            send_plane: 1,
            dest: links.down,
            recv_plane: ghost - 1,
            source: links.up,
            tag: CommTag::HALO_DOWN,
        },
    ];

    let mut stats = HaloStats::default();
    for swap in swaps {
        if swap.dest.is_none() && swap.source.is_none() {
            continue;
        }
        let send: &[u8] = match swap.dest {
            Some(_) => {
                field.copy_plane_out(swap.send_plane, &mut scratch.send)?;
                stats.sent_planes += 1;
                cast_slice(&scratch.send)
            }
            None => &[],
        };
        let recv: &mut [u8] = match swap.source {
            Some(_) => cast_slice_mut(&mut scratch.recv),
            None => &mut [],
        };
        comm.sendrecv(swap.dest, send, swap.source, recv, swap.tag)?;
        if swap.source.is_some() {
            field.copy_plane_in(swap.recv_plane, &scratch.recv)?;
            stats.received_planes += 1;
        }
    }
    log::debug!(
        "[rank {}] halo exchange: sent {} planes, received {}",
        comm.rank(),
        stats.sent_planes,
        stats.received_planes
    );
    Ok(stats)
}

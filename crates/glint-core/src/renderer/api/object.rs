// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! GPU-side bookkeeping carried by every CPU resource descriptor.
//!
//! A [`GpuObject`] holds the native handle mirrored by its descriptor and the
//! "update needed" (dirty) flag. The state lives behind a reference-counted cell
//! so a backend's object registry can observe it through a [`WeakGpuObject`]:
//! once the descriptor is dropped the weak side reports it dead and the backend
//! deletes the orphaned handle at the next frame boundary.
//!
//! The reference counting is deliberately single-threaded (`Rc`), which makes
//! every descriptor `!Send`: resources may only be touched from the thread that
//! owns the device context.

use crate::renderer::error::RenderError;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// A process-unique identifier for a CPU-side resource descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl ObjectId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ObjectId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An opaque native object name (buffer, texture, shader, program, framebuffer...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeHandle(pub u32);

/// The kind of native object a descriptor mirrors, which decides how it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    /// A vertex or index buffer object.
    Buffer,
    /// A texture object.
    Texture,
    /// A shader object (one compiled source).
    ShaderSource,
    /// A linked program object.
    Program,
    /// A framebuffer object.
    FrameBuffer,
    /// A renderbuffer object.
    RenderBuffer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GpuState {
    handle: Option<NativeHandle>,
    update_needed: bool,
}

impl GpuState {
    const UNALLOCATED: Self = Self {
        handle: None,
        update_needed: true,
    };
}

/// The native handle and dirty flag of one resource descriptor.
///
/// A freshly created object has no handle and needs an update. The handle is
/// assigned by the backend on first use; `update_needed` is cleared after each
/// successful upload and set again whenever the CPU-side content changes.
///
/// Cloning never shares the native object: the clone starts unallocated, so two
/// descriptors can never delete the same handle.
#[derive(Debug)]
pub struct GpuObject {
    id: ObjectId,
    kind: NativeKind,
    state: Rc<Cell<GpuState>>,
}

impl GpuObject {
    /// Creates an unallocated object of the given kind.
    pub fn new(kind: NativeKind) -> Self {
        Self {
            id: ObjectId::next(),
            kind,
            state: Rc::new(Cell::new(GpuState::UNALLOCATED)),
        }
    }

    /// The unique identifier of the owning descriptor.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The kind of native object mirrored.
    pub fn kind(&self) -> NativeKind {
        self.kind
    }

    /// The native handle, or `None` while unallocated.
    pub fn handle(&self) -> Option<NativeHandle> {
        self.state.get().handle
    }

    /// Returns `true` once a native handle has been assigned.
    pub fn is_allocated(&self) -> bool {
        self.handle().is_some()
    }

    /// Returns `true` if the device-side copy is stale or absent.
    pub fn is_update_needed(&self) -> bool {
        self.state.get().update_needed
    }

    /// Marks the device-side copy as stale.
    pub fn set_update_needed(&self) {
        let mut state = self.state.get();
        state.update_needed = true;
        self.state.set(state);
    }

    /// Stores the native handle allocated for this object. The dirty flag is left set.
    pub fn set_handle(&self, handle: NativeHandle) {
        self.state.set(GpuState {
            handle: Some(handle),
            update_needed: true,
        });
    }

    /// Clears the dirty flag after a successful upload.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PreconditionViolation`] if no handle was allocated:
    /// an unallocated object always needs an update.
    pub fn clear_update_needed(&self) -> Result<(), RenderError> {
        let mut state = self.state.get();
        if state.handle.is_none() {
            return Err(RenderError::PreconditionViolation(format!(
                "cannot clear the update flag of unallocated {:?} object {:?}",
                self.kind, self.id
            )));
        }
        state.update_needed = false;
        self.state.set(state);
        Ok(())
    }

    /// Forgets the native handle without deleting it and marks the object dirty.
    ///
    /// Used after the handle was deleted or the device context was lost.
    pub fn reset(&self) {
        self.state.set(GpuState::UNALLOCATED);
    }

    /// Creates a weak observer of this object for a backend registry.
    pub fn downgrade(&self) -> WeakGpuObject {
        WeakGpuObject {
            id: self.id,
            kind: self.kind,
            state: Rc::downgrade(&self.state),
        }
    }
}

impl Clone for GpuObject {
    fn clone(&self) -> Self {
        Self::new(self.kind)
    }
}

/// A registry-side view of a [`GpuObject`] that does not keep its descriptor alive.
#[derive(Debug, Clone)]
pub struct WeakGpuObject {
    id: ObjectId,
    kind: NativeKind,
    state: Weak<Cell<GpuState>>,
}

impl WeakGpuObject {
    /// The identifier of the observed descriptor.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// The kind of native object observed.
    pub fn kind(&self) -> NativeKind {
        self.kind
    }

    /// Returns `true` while the descriptor still exists.
    pub fn is_alive(&self) -> bool {
        self.state.strong_count() > 0
    }

    /// The descriptor's current handle, or `None` if it is gone or unallocated.
    pub fn handle(&self) -> Option<NativeHandle> {
        self.state.upgrade().and_then(|state| state.get().handle)
    }

    /// Returns the descriptor to the unallocated, dirty state if it still exists.
    pub fn reset(&self) {
        if let Some(state) = self.state.upgrade() {
            state.set(GpuState::UNALLOCATED);
        }
    }
}

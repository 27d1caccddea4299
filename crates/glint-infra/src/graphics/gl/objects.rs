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

//! Registry of native objects and end-of-frame reclamation.

use super::device::GlDevice;
use glint_core::renderer::api::{GpuObject, NativeHandle, NativeKind, ObjectId, WeakGpuObject};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Tracked {
    object: WeakGpuObject,
    handle: NativeHandle,
}

/// A native object deleted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reclaimed {
    /// The kind of the deleted object.
    pub kind: NativeKind,
    /// The deleted native name.
    pub handle: NativeHandle,
}

/// Deletes one native object of any kind.
pub fn delete_native<D: GlDevice>(device: &mut D, kind: NativeKind, handle: NativeHandle) {
    let name = handle.0;
    match kind {
        NativeKind::Buffer => device.delete_buffer(name),
        NativeKind::Texture => device.delete_texture(name),
        NativeKind::ShaderSource => device.delete_shader(name),
        NativeKind::Program => device.delete_program(name),
        NativeKind::FrameBuffer => device.delete_framebuffer(name),
        NativeKind::RenderBuffer => device.delete_renderbuffer(name),
    }
}

/// Keeps a weak reference to every descriptor that owns a native object.
///
/// Registration happens right after a handle is allocated. When a descriptor
/// is dropped its native object is orphaned; [`NativeObjectManager::sweep`]
/// deletes orphans, oldest first, a bounded number at a time.
#[derive(Debug, Default)]
pub struct NativeObjectManager {
    tracked: BTreeMap<ObjectId, Tracked>,
}

impl NativeObjectManager {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking an allocated object. Registering it again updates its handle.
    pub fn register(&mut self, object: &GpuObject) {
        let Some(handle) = object.handle() else {
            log::warn!(
                "Cannot register unallocated {:?} object {:?}",
                object.kind(),
                object.id()
            );
            return;
        };
        self.tracked.insert(
            object.id(),
            Tracked {
                object: object.downgrade(),
                handle,
            },
        );
    }

    /// Stops tracking an object whose native object was deleted explicitly.
    ///
    /// Returns `false` if the object was not tracked.
    pub fn unregister(&mut self, id: ObjectId) -> bool {
        self.tracked.remove(&id).is_some()
    }

    /// Returns `true` if the object is tracked.
    pub fn is_registered(&self, id: ObjectId) -> bool {
        self.tracked.contains_key(&id)
    }

    /// The number of tracked objects.
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// Returns `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// The number of tracked objects whose descriptor was dropped.
    pub fn orphan_count(&self) -> usize {
        self.tracked
            .values()
            .filter(|tracked| !tracked.object.is_alive())
            .count()
    }

    /// Deletes the native objects of at most `budget` dropped descriptors.
    ///
    /// Orphans beyond the budget stay registered for the next sweep.
    pub fn sweep<D: GlDevice>(&mut self, device: &mut D, budget: usize) -> Vec<Reclaimed> {
        let orphans: Vec<ObjectId> = self
            .tracked
            .iter()
            .filter(|(_, tracked)| !tracked.object.is_alive())
            .map(|(id, _)| *id)
            .take(budget)
            .collect();

        let mut reclaimed = Vec::with_capacity(orphans.len());
        for id in orphans {
            if let Some(tracked) = self.tracked.remove(&id) {
                let kind = tracked.object.kind();
                delete_native(device, kind, tracked.handle);
                reclaimed.push(Reclaimed {
                    kind,
                    handle: tracked.handle,
                });
            }
        }

        if !reclaimed.is_empty() {
            log::debug!(
                "Deleted {} unused native objects, {} left to reclaim",
                reclaimed.len(),
                self.orphan_count()
            );
        }
        reclaimed
    }

    /// Forgets every native object without deleting it, after the context was lost.
    ///
    /// Live descriptors go back to the unallocated, dirty state.
    pub fn reset_objects(&mut self) {
        for tracked in self.tracked.values() {
            tracked.object.reset();
        }
        self.tracked.clear();
    }

    /// Deletes every tracked native object, live or orphaned.
    pub fn delete_all<D: GlDevice>(&mut self, device: &mut D) -> Vec<Reclaimed> {
        let tracked = std::mem::take(&mut self.tracked);
        let mut reclaimed = Vec::with_capacity(tracked.len());
        for tracked in tracked.into_values() {
            let kind = tracked.object.kind();
            delete_native(device, kind, tracked.handle);
            tracked.object.reset();
            reclaimed.push(Reclaimed {
                kind,
                handle: tracked.handle,
            });
        }
        reclaimed
    }
}

//! Mixin composition.
//!
//! `mixin(B, [M1, M2])` synthesizes the chain `B <- (B with M1) <- (B with
//! M1, M2)`. Each link is a fresh class whose provider list appends the
//! mixin applied at that link, so later mixins shadow earlier ones and the
//! base. Links are never cached: two compositions of the same base and
//! mixins are distinct classes even though their display names agree.
//! Generic mixins arrive already instantiated (`C<Set<V>>` with `V` bound by
//! the enclosing builder).

use crate::class::ClassBuilder;
use crate::runtime::Runtime;
use ddcrt_types::{ClassFlags, ClassId, ConfigurationError, TypeId};
use tracing::debug;

impl Runtime {
    /// Compose `base` with `mixins` and return the last link.
    pub fn mixin(&self, base: TypeId, mixins: &[TypeId]) -> Result<TypeId, ConfigurationError> {
        let base_id = self.class_of_type(base)?;
        let mixin_ids = mixins
            .iter()
            .map(|&m| self.class_of_type(m))
            .collect::<Result<Vec<_>, _>>()?;
        let last = self.compose_links(base_id, &mixin_ids)?;
        Ok(self.interner.class_type(last))
    }

    pub(crate) fn compose_links(
        &self,
        base: ClassId,
        mixins: &[ClassId],
    ) -> Result<ClassId, ConfigurationError> {
        let base_name = self.render(self.interner.class_type(base));
        let mut applied = Vec::with_capacity(mixins.len());
        let mut current = base;
        for &mixin in mixins {
            if self.class_info(mixin).is_none() {
                return Err(ConfigurationError::NotAClass {
                    name: self.render(self.interner.class_type(mixin)),
                });
            }
            applied.push(self.render(self.interner.class_type(mixin)));
            let name = format!("{base_name} with {}", applied.join(", "));
            let mut link = ClassBuilder::reserved(self, &name, None);
            link.applied_mixin = Some(mixin);
            link.flags |= ClassFlags::MIXIN_APPLICATION;
            let link_id = link.id;
            self.install_class(link, Some(current), vec![mixin], Vec::new());
            debug!(link = %name, id = link_id.0, "compose_links");
            current = link_id;
        }
        Ok(current)
    }
}

#[cfg(test)]
#[path = "../tests/mixin_tests.rs"]
mod tests;

/// The handful of knobs this back end's module emitter treats as named
/// constants rather than magic numbers: how many 64 KiB pages of linear
/// memory the module declares, and how much headroom is left between the
/// end of the globals region and where the software stack starts growing
/// downward from.
///
/// Everything else about the generated module's shape — the ABI, the
/// `_start` export convention, the activation-record layout — is fixed
/// and not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    pub memory_pages: u32,
    pub stack_headroom: u32,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            memory_pages: 2,
            stack_headroom: 1024,
        }
    }
}

pub mod framebuffer;
pub mod gpu_context;
pub mod presenter;

pub use framebuffer::FrameBuffer;
pub use gpu_context::GpuContext;
pub use presenter::Presenter;

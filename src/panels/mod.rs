mod canvas_panel;
mod result_panel;
mod tools_panel;

pub use canvas_panel::canvas_panel;
pub use result_panel::result_panel;
pub use tools_panel::tools_panel;

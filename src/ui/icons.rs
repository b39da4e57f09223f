pub struct Icons;

impl Icons {
    pub const PLUG: &str = "🔌";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const DOWN: &str = "⬇️";
}

/// Format RGBA as a CSS color string.
pub fn rgba_css(r: u8, g: u8, b: u8, a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

pub const PAGE_BACKGROUND: &str = "#0f1219";
pub const PANEL_BACKGROUND: &str = "#161a24";
pub const PANEL_BORDER: &str = "#2a3040";
pub const TEXT_PRIMARY: &str = "#e4e2da";
pub const TEXT_MUTED: &str = "#7d7b84";
pub const ACCENT: &str = "#f2b94b";

pub const FLOOR_FILL: (u8, u8, u8) = (38, 44, 58);
pub const FLOOR_STROKE: (u8, u8, u8) = (58, 66, 84);

pub const ROUTE_LINE: (u8, u8, u8) = (84, 170, 255);
pub const ROUTE_START: (u8, u8, u8) = (72, 199, 116);
pub const ROUTE_END: (u8, u8, u8) = (235, 87, 87);
pub const ROUTE_STOP: (u8, u8, u8) = (242, 185, 75);

pub const PRODUCT_FILL: (u8, u8, u8) = (148, 112, 210);
pub const WALL_FILL: (u8, u8, u8) = (88, 92, 104);
pub const EXIT_FILL: (u8, u8, u8) = (196, 70, 70);
pub const ENTRANCE_FILL: (u8, u8, u8) = (60, 168, 96);
pub const CHECKOUT_FILL: (u8, u8, u8) = (214, 150, 52);

#[cfg(test)]
mod tests {
    use super::rgba_css;

    #[test]
    fn rgba_css_formats_components() {
        assert_eq!(rgba_css(1, 2, 3, 0.5), "rgba(1,2,3,0.5)");
        assert_eq!(rgba_css(255, 255, 255, 1.0), "rgba(255,255,255,1)");
    }
}

// Shared prompt constants for the text optimizer.
// Strategy-specific system messages live in workflow/prompts.rs.

/// Used when a caller passes no system message: enrich the prompt for DALL-E 3
/// without dropping or shortening details.
pub const DEFAULT_OPTIMIZER_SYSTEM: &str = "Du bist ein Experte für DALL-E 3 Prompt-Optimierung. \
    Optimiere den folgenden Prompt für maximale Bildqualität, \
    aber entferne keine Details und kürze nichts. Ergänze nur, was für DALL-E hilfreich ist \
    (z.B. Fotografie-Begriffe, Licht, Stil, Komposition, Auflösung, Kamera, professionelle Begriffe).";

//! Built-in LaTeX sources for each transformation.
//!
//! Every template wraps the source PDF with `pdfpages` on a page of the same
//! physical size, so the engine re-emits the original pages with only the
//! requested change applied.
//!
//! Placeholders are written `@@NAME@@` and filled by
//! [`crate::pipeline::substitute`]. The `@@` fence never occurs in valid LaTeX
//! and makes a missed substitution easy to detect.

/// Page numbering: folio in the outer footer corner, counting from
/// `@@STARTING_PAGE@@`.
///
/// `@@FOOTER_POSITIONS@@` is a fancyhdr selector, `LE,RO` or `LO,RE`.
pub const PAGE_NUMBERING: &str = r"\documentclass[twoside]{article}
\usepackage[paperheight=@@PDF_HEIGHT@@,paperwidth=@@PDF_WIDTH@@,left=@@LEFT_MARGIN@@,right=@@RIGHT_MARGIN@@]{geometry}
\usepackage{pdfpages}
\usepackage{fancyhdr}

\pagestyle{fancy}
\fancyhf{}
\renewcommand{\headrulewidth}{0pt}
\renewcommand{\footrulewidth}{0pt}
\fancyfoot[@@FOOTER_POSITIONS@@]{\thepage}

\begin{document}
\setcounter{page}{@@STARTING_PAGE@@}
\includepdf[pages=-,pagecommand={\thispagestyle{fancy}}]{@@PDF_PATH@@}
\end{document}
";

/// Blank page: every source page followed by one empty page of the same size.
pub const BLANK_PAGE: &str = r"\documentclass{article}
\usepackage[paperheight=@@PDF_HEIGHT@@,paperwidth=@@PDF_WIDTH@@]{geometry}
\usepackage{pdfpages}

\begin{document}
\includepdf[pages=-]{@@PDF_PATH@@}
\includepdf[pages={{}}]{@@PDF_PATH@@}
\end{document}
";

/// Gutter margin: pages shifted by `@@GUTTER@@` away from the binding edge.
///
/// In a `twoside` document pdfpages mirrors the horizontal offset on even
/// pages, so odd pages move right and even pages move left.
pub const GUTTER_MARGIN: &str = r"\documentclass[twoside]{article}
\usepackage[paperheight=@@PDF_HEIGHT@@,paperwidth=@@PDF_WIDTH@@]{geometry}
\usepackage{pdfpages}

\begin{document}
\includepdf[pages=-,offset=@@GUTTER@@ 0]{@@PDF_PATH@@}
\end{document}
";

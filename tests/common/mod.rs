#![allow(dead_code)]

use std::path::Path;

pub const LOSS_ADJUSTER_TABLE: &str = r#"<html>
<body>
<table id="Table5999962Lossadjusterchartered">
<caption>Table 59.99.9.62 Loss adjuster, chartered</caption>
<thead>
<tr><th></th><th>Daniel Brown</th><th>Shane Barnes DDS</th><th>Nicole Carpenter</th><th>Kristin Duarte</th></tr>
</thead>
<tbody>
<tr><td>Roberts LLC</td><td>1060</td><td>37</td><td>1593</td><td>1364</td></tr>
</tbody>
<tfoot>
<tr><td>Creation: 3Feb2013 Chad</td></tr>
</tfoot>
</table>
</body>
</html>
"#;

/// Four data columns under three headers, with percentage cells.
pub const WIDE_BODY_TABLE: &str = r#"<html>
<body>
<table id="Table1234Accountant">
<caption>Table 12.34 Accountant</caption>
<thead>
<tr><th></th><th>Kenneth Decker</th><th>Benjamin Newman</th><th>Susan Miller</th></tr>
</thead>
<tbody>
<tr><td>Reeves-George</td><td>699</td><td>1465</td><td>1281</td><td>587</td></tr>
<tr><td>Atkinson and Sons</td><td>846%</td><td>356</td><td>850%</td><td>1060</td></tr>
</tbody>
<tfoot>
<tr><td>Creation: 31August22 Bosnia and Herzegovina</td></tr>
</tfoot>
</table>
</body>
</html>
"#;

pub const NO_FOOTER_TABLE: &str = r#"<html>
<body>
<table>
<caption>Table 7 Surveyor</caption>
<thead>
<tr><th></th><th>Laurie Wade</th></tr>
</thead>
<tbody>
<tr><td>Hart Ltd</td><td>12</td></tr>
</tbody>
</table>
</body>
</html>
"#;

pub fn write_fixture(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("HTML fixture should be written");
}

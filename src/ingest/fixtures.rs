/// Test fixtures: representative JSON payloads from the USGS IV and DV APIs.
///
/// These fixtures are structurally complete but truncated to the minimum
/// needed to exercise the parser. They reflect the WaterML-as-JSON envelope
/// returned by:
///   https://waterservices.usgs.gov/nwis/iv/?format=json&...
///   https://waterservices.usgs.gov/nwis/dv/?format=json&...
///
/// Response shape:
///   response.value.timeSeries[]
///     .sourceInfo.siteCode[0].value  — site number (string)
///     .variable.variableCode[0].value — parameter code (string)
///     .variable.noDataValue          — sentinel for missing data (-999999)
///     .values[].value[]
///       .value     — the measurement as a STRING (may be null)
///       .dateTime  — ISO 8601 with offset
///
/// Measurement values are JSON strings, even though they represent numbers.

/// Waltham gauge (01104500) with discharge listed before gage height.
/// The parser must skip the 00060 series and take the last 00065 entry
/// (3.12 ft at 10:15).
#[cfg(test)]
pub(crate) fn fixture_waltham_iv_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "CHARLES RIVER AT WALTHAM, MA",
              "siteCode": [{ "value": "01104500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00060", "network": "NWIS" }],
              "variableName": "Streamflow, ft&#179;/s",
              "unit": { "unitCode": "ft3/s" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "412", "qualifiers": ["P"], "dateTime": "2024-05-01T10:15:00.000-04:00" }
              ]
            }]
          },
          {
            "sourceInfo": {
              "siteName": "CHARLES RIVER AT WALTHAM, MA",
              "siteCode": [{ "value": "01104500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00065", "network": "NWIS" }],
              "variableName": "Gage height, ft",
              "unit": { "unitCode": "ft" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "3.05", "qualifiers": ["P"], "dateTime": "2024-05-01T10:00:00.000-04:00" },
                { "value": "3.12", "qualifiers": ["P"], "dateTime": "2024-05-01T10:15:00.000-04:00" }
              ]
            }]
          }
        ]
      }
    }"#
}

/// Daily gage height for Dover (01103500): five days with one null, one
/// empty string and one sentinel mixed in, deliberately out of date order.
/// Valid history is 05-01: 2.0, 05-02: 2.4, 05-04: 1.8.
#[cfg(test)]
pub(crate) fn fixture_dover_dv_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "CHARLES RIVER AT DOVER, MA",
              "siteCode": [{ "value": "01103500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00065", "network": "NWIS" }],
              "variableName": "Gage height, ft",
              "unit": { "unitCode": "ft" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "2.4", "qualifiers": ["P"], "dateTime": "2024-05-02T00:00:00.000" },
                { "value": "2.0", "qualifiers": ["A"], "dateTime": "2024-05-01T00:00:00.000" },
                { "value": null, "qualifiers": ["P"], "dateTime": "2024-05-03T00:00:00.000" },
                { "value": "1.8", "qualifiers": ["P"], "dateTime": "2024-05-04T00:00:00.000" },
                { "value": "", "qualifiers": ["P"], "dateTime": "2024-05-05T00:00:00.000" },
                { "value": "-999999", "qualifiers": ["P"], "dateTime": "2024-05-06T00:00:00.000" }
              ]
            }]
          }
        ]
      }
    }"#
}

/// Discharge-only response: a well-formed envelope without any 00065
/// series. Parsers must report the missing variable.
#[cfg(test)]
pub(crate) fn fixture_discharge_only_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "CHARLES RIVER AT DOVER, MA",
              "siteCode": [{ "value": "01103500", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00060", "network": "NWIS" }],
              "unit": { "unitCode": "ft3/s" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "180", "qualifiers": ["P"], "dateTime": "2024-05-01T10:15:00.000-04:00" }
              ]
            }]
          }
        ]
      }
    }"#
}

/// Gage height series whose only entry is the -999999 sentinel. The current
/// reading must come back absent rather than as -999999 ft.
#[cfg(test)]
pub(crate) fn fixture_sentinel_iv_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "CHARLES RIVER AT NEW CHARLES RIVER DAM, MA",
              "siteCode": [{ "value": "01104715", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00065", "network": "NWIS" }],
              "unit": { "unitCode": "ft" },
              "noDataValue": -999999.0
            },
            "values": [{
              "value": [
                { "value": "-999999", "qualifiers": ["P"], "dateTime": "2024-05-01T10:15:00.000-04:00" }
              ]
            }]
          }
        ]
      }
    }"#
}

/// Gage height series with an empty value array: sensor outage.
#[cfg(test)]
pub(crate) fn fixture_empty_values_json() -> &'static str {
    r#"{
      "value": {
        "timeSeries": [
          {
            "sourceInfo": {
              "siteName": "CHARLES RIVER AT FIRST ST, CAMBRIDGE, MA",
              "siteCode": [{ "value": "01104705", "network": "NWIS", "agencyCode": "USGS" }]
            },
            "variable": {
              "variableCode": [{ "value": "00065", "network": "NWIS" }],
              "unit": { "unitCode": "ft" },
              "noDataValue": -999999.0
            },
            "values": [{ "value": [] }]
          }
        ]
      }
    }"#
}

//! Scenario tests that drive a whole [`Board`](nightscout_tag_lib::cycle::Board)
//! through recording mocks.

mod support;

//! Shared test fixtures.
//!
//! A compact but shape-complete discharge summary template used by unit
//! tests across the workspace. It carries every segment the classifier
//! knows about: MSH, two provider contacts, PID with an IHI repetition,
//! PV1, two diagnoses, one allergy (coded severity, plain-text reaction),
//! two procedure groups and three observation groups.

/// A complete REF_I12 discharge summary template.
pub const SAMPLE_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<REF_I12 xmlns="urn:hl7-org:v2xml">
  <MSH>
    <MSH.1>|</MSH.1>
    <MSH.2>^~\&amp;</MSH.2>
    <MSH.4>
      <HD.1>St James's Hospital</HD.1>
    </MSH.4>
    <MSH.6>
      <HD.1>BYRNE, Niamh</HD.1>
      <HD.2>241563.1234</HD.2>
    </MSH.6>
    <MSH.7>
      <TS.1>20240101120000</TS.1>
    </MSH.7>
    <MSH.9>
      <MSG.1>REF</MSG.1>
      <MSG.2>I12</MSG.2>
    </MSH.9>
    <MSH.10>9a1f63c2-7a30-4a44-9c1e-000000000000</MSH.10>
    <MSH.11>
      <PT.1>P</PT.1>
    </MSH.11>
  </MSH>
  <REF_I12.PROVIDER_CONTACT>
    <PRD>
      <PRD.1>
        <CE.1>RP</CE.1>
      </PRD.1>
      <PRD.2>
        <XPN.1>
          <FN.1>BYRNE</FN.1>
        </XPN.1>
        <XPN.2>Niamh</XPN.2>
      </PRD.2>
      <PRD.3>
        <XAD.1>
          <SAD.1>14 MAIN STREET</SAD.1>
        </XAD.1>
        <XAD.2>NAAS</XAD.2>
        <XAD.3>KILDARE</XAD.3>
        <XAD.5>W91 X2R7</XAD.5>
      </PRD.3>
      <PRD.5>
        <XTN.1>+353 45 881234</XTN.1>
      </PRD.5>
      <PRD.7>
        <PI.1>241563</PI.1>
        <PI.3>BYRNE, Niamh</PI.3>
      </PRD.7>
    </PRD>
    <PRD>
      <PRD.1>
        <CE.1>IR</CE.1>
      </PRD.1>
      <PRD.2>
        <XPN.1>
          <FN.1>BYRNE</FN.1>
        </XPN.1>
        <XPN.2>Niamh</XPN.2>
      </PRD.2>
      <PRD.3>
        <XAD.1>
          <SAD.1>2 CHURCH ROAD</SAD.1>
        </XAD.1>
        <XAD.2>NAAS</XAD.2>
        <XAD.3>KILDARE</XAD.3>
        <XAD.5>W91 P5H2</XAD.5>
      </PRD.3>
      <PRD.5>
        <XTN.1>+353 45 886677</XTN.1>
      </PRD.5>
      <PRD.7>
        <PI.1>241563</PI.1>
        <PI.3>BYRNE, Niamh</PI.3>
      </PRD.7>
    </PRD>
  </REF_I12.PROVIDER_CONTACT>
  <PID>
    <PID.1>1</PID.1>
    <PID.3>
      <CX.1>MRN4455667</CX.1>
      <CX.4>
        <HD.1>Beaumont Hospital</HD.1>
      </CX.4>
      <CX.5>MRN</CX.5>
    </PID.3>
    <PID.3>
      <CX.1>420044556677889900</CX.1>
      <CX.5>IHINumber</CX.5>
    </PID.3>
    <PID.5>
      <XPN.1>
        <FN.1>KELLY</FN.1>
      </XPN.1>
      <XPN.2>SEAN</XPN.2>
    </PID.5>
    <PID.7>
      <TS.1>19561204</TS.1>
    </PID.7>
    <PID.8>M</PID.8>
    <PID.11>
      <XAD.1>
        <SAD.1>7 RIVERSIDE DRIVE</SAD.1>
      </XAD.1>
      <XAD.2>SWORDS</XAD.2>
      <XAD.3>DUBLIN</XAD.3>
      <XAD.5>K67 F8P2</XAD.5>
    </PID.11>
    <PID.13>
      <XTN.1>+353 86 1234567</XTN.1>
    </PID.13>
  </PID>
  <REF_I12.PATIENT_VISIT>
    <PV1>
      <PV1.2>I</PV1.2>
      <PV1.3>
        <PL.9>Beaumont Hospital</PL.9>
      </PV1.3>
      <PV1.7>
        <XCN.1>BEAUMONT HOSPITAL 1</XCN.1>
        <XCN.2>
          <FN.1>WALSH</FN.1>
        </XCN.2>
        <XCN.3>EMER</XCN.3>
        <XCN.6>DR</XCN.6>
      </PV1.7>
      <PV1.8>
        <XCN.1> </XCN.1>
        <XCN.2>
          <FN.1>WALSH</FN.1>
        </XCN.2>
        <XCN.3>EMER</XCN.3>
        <XCN.6>DR</XCN.6>
      </PV1.8>
      <PV1.9>
        <XCN.1>WALS</XCN.1>
        <XCN.2>
          <FN.1>WALSH EMER</FN.1>
        </XCN.2>
        <XCN.3/>
        <XCN.6/>
      </PV1.9>
      <PV1.19>
        <CX.1>884512345</CX.1>
      </PV1.19>
      <PV1.36>01</PV1.36>
      <PV1.37>
        <DLD.1>123456</DLD.1>
      </PV1.37>
      <PV1.44>
        <TS.1>20231220080000</TS.1>
      </PV1.44>
      <PV1.45>
        <TS.1>20231224153000</TS.1>
      </PV1.45>
    </PV1>
  </REF_I12.PATIENT_VISIT>
  <DG1>
    <DG1.1>1</DG1.1>
    <DG1.3>
      <CE.1>J18.9</CE.1>
      <CE.2>Pneumonia, unspecified organism</CE.2>
      <CE.3>I10</CE.3>
    </DG1.3>
    <DG1.4>Pneumonia, unspecified organism</DG1.4>
    <DG1.6>F</DG1.6>
    <DG1.16>
      <XCN.2>
        <FN.1>WALSH</FN.1>
      </XCN.2>
      <XCN.3>EMER</XCN.3>
      <XCN.6>DR</XCN.6>
    </DG1.16>
  </DG1>
  <DG1>
    <DG1.1>2</DG1.1>
    <DG1.3>
      <CE.1>I10</CE.1>
      <CE.2>Essential (primary) hypertension</CE.2>
      <CE.3>I10</CE.3>
    </DG1.3>
    <DG1.4>Essential (primary) hypertension</DG1.4>
    <DG1.6>W</DG1.6>
    <DG1.16>
      <XCN.2>
        <FN.1>WALSH</FN.1>
      </XCN.2>
      <XCN.3>EMER</XCN.3>
      <XCN.6>DR</XCN.6>
    </DG1.16>
  </DG1>
  <AL1>
    <AL1.1>1</AL1.1>
    <AL1.2>
      <CE.1>DA</CE.1>
      <CE.2>DRUG</CE.2>
    </AL1.2>
    <AL1.3>
      <CE.2>Penicillin</CE.2>
    </AL1.3>
    <AL1.4>
      <CE.2>MODERATE</CE.2>
    </AL1.4>
    <AL1.5>Rash</AL1.5>
  </AL1>
  <REF_I12.PROCEDURE>
    <PR1>
      <PR1.1>1</PR1.1>
      <PR1.3>
        <CE.1>CXR</CE.1>
        <CE.2>Chest X-ray (CXR)</CE.2>
        <CE.3>SCT</CE.3>
      </PR1.3>
      <PR1.4>Chest X-ray performed; findings documented.</PR1.4>
    </PR1>
  </REF_I12.PROCEDURE>
  <REF_I12.PROCEDURE>
    <PR1>
      <PR1.1>2</PR1.1>
      <PR1.3>
        <CE.1>BLOODS</CE.1>
        <CE.2>Blood tests</CE.2>
        <CE.3>SCT</CE.3>
      </PR1.3>
      <PR1.4>Blood tests performed and reviewed.</PR1.4>
    </PR1>
  </REF_I12.PROCEDURE>
  <REF_I12.OBSERVATION>
    <OBR>
      <OBR.1>1</OBR.1>
      <OBR.3>
        <EI.1>556677889901</EI.1>
      </OBR.3>
      <OBR.4>
        <CE.1>DS-SUMMARY</CE.1>
        <CE.2>Discharge Summary</CE.2>
        <CE.3>L</CE.3>
      </OBR.4>
      <OBR.7>
        <TS.1>20231224153000</TS.1>
      </OBR.7>
      <OBR.22>
        <TS.1>20231224153000</TS.1>
      </OBR.22>
    </OBR>
    <REF_I12.RESULTS_NOTES>
      <OBX>
        <OBX.1>1</OBX.1>
        <OBX.2>FT</OBX.2>
        <OBX.3>
          <CE.1>DS-SUMMARY</CE.1>
          <CE.2>Discharge Summary</CE.2>
        </OBX.3>
        <OBX.5>Admitted with cough and fever; treated and improved.</OBX.5>
        <OBX.11>F</OBX.11>
      </OBX>
    </REF_I12.RESULTS_NOTES>
  </REF_I12.OBSERVATION>
  <REF_I12.OBSERVATION>
    <OBR>
      <OBR.1>2</OBR.1>
      <OBR.3>
        <EI.1>556677889902</EI.1>
      </OBR.3>
      <OBR.4>
        <CE.1>DS-COURSE</CE.1>
        <CE.2>Hospital Course</CE.2>
        <CE.3>L</CE.3>
      </OBR.4>
      <OBR.7>
        <TS.1>20231224153000</TS.1>
      </OBR.7>
      <OBR.22>
        <TS.1>20231224153000</TS.1>
      </OBR.22>
    </OBR>
    <REF_I12.RESULTS_NOTES>
      <OBX>
        <OBX.1>1</OBX.1>
        <OBX.2>FT</OBX.2>
        <OBX.3>
          <CE.1>DS-COURSE</CE.1>
          <CE.2>Hospital Course</CE.2>
        </OBX.3>
        <OBX.5>Assessed by the admitting team and managed per protocol.</OBX.5>
        <OBX.11>F</OBX.11>
      </OBX>
    </REF_I12.RESULTS_NOTES>
  </REF_I12.OBSERVATION>
  <REF_I12.OBSERVATION>
    <OBR>
      <OBR.1>3</OBR.1>
      <OBR.3>
        <EI.1>556677889903</EI.1>
      </OBR.3>
      <OBR.4>
        <CE.1>DS-EVAL</CE.1>
        <CE.2>Evaluation / Investigations</CE.2>
        <CE.3>L</CE.3>
      </OBR.4>
      <OBR.7>
        <TS.1>20231224153000</TS.1>
      </OBR.7>
      <OBR.22>
        <TS.1>20231224153000</TS.1>
      </OBR.22>
    </OBR>
    <REF_I12.RESULTS_NOTES>
      <OBX>
        <OBX.1>1</OBX.1>
        <OBX.2>FT</OBX.2>
        <OBX.3>
          <CE.1>DS-EVAL-1</CE.1>
          <CE.2>Chest X-ray (CXR)</CE.2>
        </OBX.3>
        <OBX.5>CXR: patchy airspace opacification; no effusion.</OBX.5>
        <OBX.11>F</OBX.11>
      </OBX>
      <OBX>
        <OBX.1>2</OBX.1>
        <OBX.2>FT</OBX.2>
        <OBX.3>
          <CE.1>DS-EVAL-2</CE.1>
          <CE.2>Inflammatory markers (WCC/CRP)</CE.2>
        </OBX.3>
        <OBX.5>Bloods: raised inflammatory markers; trend improving.</OBX.5>
        <OBX.11>F</OBX.11>
      </OBX>
      <OBX>
        <OBX.1>3</OBX.1>
        <OBX.2>NM</OBX.2>
        <OBX.3>
          <CE.1>DS-EVAL-3</CE.1>
          <CE.2>Oxygen saturation</CE.2>
        </OBX.3>
        <OBX.5>96</OBX.5>
        <OBX.11>F</OBX.11>
      </OBX>
    </REF_I12.RESULTS_NOTES>
  </REF_I12.OBSERVATION>
</REF_I12>
"#;
